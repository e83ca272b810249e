use crate::lexer::Position;

/// Abstract Syntax Tree node representing one template value.
///
/// The AST is produced by the parser and consumed once by the
/// [builder](crate::builder), which turns it into an executable
/// [`Node`](crate::node::Node).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String(String),

    /// Number literal
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Number(f64),

    /// Boolean literal
    Bool(bool),

    /// Null literal
    Null,

    /// Object literal with optionally annotated fields
    ///
    /// # Example
    /// ```text
    /// {"name": $.name, @deprecated "total": $.total}
    /// ```
    Object(Vec<AnnotatedField>),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [$.first, $.second, 3]
    /// ```
    Array(Vec<Expr>),

    // Template elements
    /// Generator mapping a sub-template over every match of a query
    ///
    /// # Example
    /// ```text
    /// range $.items[*] [ {"name": $.name} ]
    /// ```
    Generator {
        range: String,
        template: Box<Expr>,
        position: Position,
    },

    /// Bare query, replaced by the data it selects
    ///
    /// # Example
    /// ```text
    /// $.store.bicycle.color
    /// ```
    Extractor { query: String, position: Position },

    /// Host function call
    ///
    /// # Example
    /// ```text
    /// to_upper($.name)
    /// ```
    Call {
        name: String,
        args: Vec<Expr>,
        position: Position,
    },
}

/// One member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedField {
    /// Label from an `@identifier` prefix; never rendered
    pub annotation: Option<String>,
    pub key: String,
    pub value: Expr,
}
