use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Number literal; integers and floats share one domain
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// -1.0
    /// .5
    /// 1e3
    /// ```
    Number(f64),

    /// String literal enclosed in double quotes, escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "tab\tseparated"
    /// "é"
    /// ```
    String(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Null value
    Null,

    /// Generator keyword
    ///
    /// # Examples
    /// ```text
    /// range $.items[*] [ $.name ]
    /// ```
    Range,

    /// Path query, captured verbatim
    ///
    /// The lexer only finds where the query ends; its segments are compiled
    /// later by [`crate::path::Path::compile`].
    ///
    /// # Examples
    /// ```text
    /// $
    /// $.store.book[0].title
    /// $..price
    /// $.items[1:3]
    /// ```
    Path(String),

    /// Function name or annotation label
    ///
    /// Must start with letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// to_upper
    /// deprecated
    /// _internal
    /// ```
    Identifier(String),

    /// Annotation prefix
    ///
    /// # Examples
    /// ```text
    /// { @deprecated "old": 1 }
    /// ```
    At,

    // Delimiters
    /// Left bracket for arrays and generator bodies
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis for function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left brace for objects
    LBrace,

    /// Right brace
    RBrace,

    /// Comma for separating arguments, fields or array elements
    Comma,

    /// Colon between an object key and its value
    Colon,

    /// End of file
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::Boolean(b) => write!(f, "'{}'", b),
            Token::Null => write!(f, "'null'"),
            Token::Range => write!(f, "'range'"),
            Token::Path(p) => write!(f, "query '{}'", p),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::At => write!(f, "'@'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Comma => write!(f, "','"),
            Token::Colon => write!(f, "':'"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}
