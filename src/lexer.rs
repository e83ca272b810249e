use std::fmt;

use thiserror::Error;

use crate::ast::Token;

/// Location of a character in the template source (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    /// Character offset from the start of the source
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors produced while splitting template source into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{escape}' at {position}")]
    InvalidEscape { escape: String, position: Position },

    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("unterminated '[' in query '{query}' starting at {position}")]
    UnterminatedQuery { query: String, position: Position },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    token_start: Position,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            token_start: Position::default(),
        }
    }

    /// Where the most recently returned token begins.
    pub fn token_start(&self) -> Position {
        self.token_start
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    /// Skips whitespace and `#` line comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '#' {
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.here();
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('u') => {
                            self.advance();
                            result.push(self.read_unicode_escape(escape_at)?);
                            continue;
                        }
                        Some(other) => {
                            return Err(LexError::InvalidEscape {
                                escape: other.to_string(),
                                position: escape_at,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_hex4(&mut self, escape_at: Position) -> Result<u32, LexError> {
        let mut digits = String::with_capacity(4);
        for _ in 0..4 {
            match self.current_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.advance();
                }
                _ => {
                    return Err(LexError::InvalidEscape {
                        escape: format!("u{}", digits),
                        position: escape_at,
                    });
                }
            }
        }
        u32::from_str_radix(&digits, 16).map_err(|_| LexError::InvalidEscape {
            escape: format!("u{}", digits),
            position: escape_at,
        })
    }

    /// Decodes the code point after `\u`, combining UTF-16 surrogate pairs.
    fn read_unicode_escape(&mut self, escape_at: Position) -> Result<char, LexError> {
        let high = self.read_hex4(escape_at)?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if self.current_char() != Some('\\') || self.peek_char(1) != Some('u') {
                return Err(LexError::InvalidEscape {
                    escape: format!("u{:04x}", high),
                    position: escape_at,
                });
            }
            self.advance();
            self.advance();
            let low = self.read_hex4(escape_at)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(LexError::InvalidEscape {
                    escape: format!("u{:04x}", low),
                    position: escape_at,
                });
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or(LexError::InvalidEscape {
            escape: format!("u{:04x}", code),
            position: escape_at,
        })
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }
        self.read_digits(&mut number);

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let sign = self.peek_char(1);
            let digits_at = if matches!(sign, Some('+' | '-')) { 2 } else { 1 };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    if let Some(c) = self.current_char() {
                        number.push(c);
                    }
                    self.advance();
                }
                self.read_digits(&mut number);
            }
        }

        match number.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            _ => Err(LexError::InvalidNumber {
                text: number,
                position: start,
            }),
        }
    }

    /// Reads a query starting at `$`. Only the extent of the query is found
    /// here; the path compiler validates its segments.
    fn read_path(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        let mut path = String::from("$");
        self.advance();

        while let Some(ch) = self.current_char() {
            match ch {
                '.' | '*' => {
                    path.push(ch);
                    self.advance();
                }
                c if c.is_ascii_alphanumeric() || c == '_' => {
                    path.push_str(&self.read_identifier());
                }
                '[' => self.read_path_bracket(&mut path, start)?,
                _ => break,
            }
        }

        Ok(Token::Path(path))
    }

    fn read_path_bracket(&mut self, path: &mut String, start: Position) -> Result<(), LexError> {
        let mut quote: Option<char> = None;
        while let Some(ch) = self.current_char() {
            path.push(ch);
            self.advance();
            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), '\\') => {
                    if let Some(escaped) = self.current_char() {
                        path.push(escaped);
                        self.advance();
                    }
                }
                (Some(_), _) => {}
                (None, '\'' | '"') => quote = Some(ch),
                (None, ']') => return Ok(()),
                (None, _) => {}
            }
        }
        Err(LexError::UnterminatedQuery {
            query: path.clone(),
            position: start,
        })
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        self.token_start = self.here();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('$') => self.read_path()?,
            Some('"') => Token::String(self.read_string()?),
            Some('@') => {
                self.advance();
                Token::At
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some('{') => {
                self.advance();
                Token::LBrace
            }
            Some('}') => {
                self.advance();
                Token::RBrace
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                self.read_number()?
            }
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    "range" => Token::Range,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    position: self.token_start,
                });
            }
        };
        Ok(token)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false null range");
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
    assert_eq!(lexer.next_token().unwrap(), Token::Range);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_generator_head() {
    let mut lexer = Lexer::new("range $.items[*] [$.n]");
    assert_eq!(lexer.next_token().unwrap(), Token::Range);
    assert_eq!(lexer.next_token().unwrap(), Token::Path("$.items[*]".into()));
    assert_eq!(lexer.next_token().unwrap(), Token::LBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Path("$.n".into()));
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}
