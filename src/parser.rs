use std::mem;

use thiserror::Error;

use crate::{
    ast::{AnnotatedField, Expr, Token},
    lexer::{LexError, Lexer, Position},
};

/// Errors produced while reading template source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found} at {position}")]
    Unexpected {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("template nests deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(
                LexError::UnexpectedChar { position, .. }
                | LexError::UnterminatedString { position }
                | LexError::InvalidEscape { position, .. }
                | LexError::InvalidNumber { position, .. }
                | LexError::UnterminatedQuery { position, .. },
            ) => *position,
            ParseError::Unexpected { position, .. } | ParseError::TooDeep { position, .. } => {
                *position
            }
        }
    }
}

/// How many objects, arrays, calls and generators may enclose one another.
pub const MAX_DEPTH: usize = 128;

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_position: Position,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            current_position,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_start();
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: self.current_token.to_string(),
            position: self.current_position,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if mem::discriminant(&self.current_token) != mem::discriminant(&expected) {
            return Err(self.unexpected(&expected.to_string()));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    /// Run `parse` one nesting level down, opened by the token at `position`.
    fn nested<T>(
        &mut self,
        position: Position,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                position,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse one value: a JSON literal or one of the template elements.
    fn parse_value(&mut self) -> Result<Expr, ParseError> {
        let position = self.current_position;
        match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Bool(b))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Null)
            }
            Token::LBrace => self.nested(position, |p| {
                p.advance()?;
                p.parse_object_literal()
            }),
            Token::LBracket => self.nested(position, |p| {
                p.advance()?;
                let elements = p.parse_sequence(Token::RBracket, true)?;
                Ok(Expr::Array(elements))
            }),

            // Template elements
            Token::Path(query) => {
                self.advance()?;
                Ok(Expr::Extractor { query, position })
            }
            Token::Range => self.nested(position, |p| {
                p.advance()?;
                p.parse_generator(position)
            }),
            Token::Identifier(name) => self.nested(position, |p| {
                p.advance()?;
                p.expect(Token::LParen)?;
                let args = p.parse_sequence(Token::RParen, false)?;
                Ok(Expr::Call {
                    name,
                    args,
                    position,
                })
            }),

            token => {
                self.current_token = token;
                Err(self.unexpected("a value"))
            }
        }
    }

    fn parse_generator(&mut self, position: Position) -> Result<Expr, ParseError> {
        let range = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Path(query) => query,
            token => {
                self.current_token = token;
                return Err(self.unexpected("a query after 'range'"));
            }
        };
        self.advance()?;

        self.expect(Token::LBracket)?;
        let template = self.parse_value()?;
        self.expect(Token::RBracket)?;

        Ok(Expr::Generator {
            range,
            template: Box::new(template),
            position,
        })
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut fields = vec![];

        while !self.check(&Token::RBrace) {
            fields.push(self.parse_field()?);

            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Expr::Object(fields))
    }

    fn parse_field(&mut self) -> Result<AnnotatedField, ParseError> {
        let annotation = if self.check(&Token::At) {
            self.advance()?;
            match mem::replace(&mut self.current_token, Token::Eof) {
                Token::Identifier(label) => {
                    self.advance()?;
                    Some(label)
                }
                // keywords are plain labels here
                Token::Range => {
                    self.advance()?;
                    Some("range".to_string())
                }
                Token::Boolean(b) => {
                    self.advance()?;
                    Some(b.to_string())
                }
                Token::Null => {
                    self.advance()?;
                    Some("null".to_string())
                }
                token => {
                    self.current_token = token;
                    return Err(self.unexpected("an annotation name after '@'"));
                }
            }
        } else {
            None
        };

        let key = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(key) => key,
            token => {
                self.current_token = token;
                return Err(self.unexpected("a string key"));
            }
        };
        self.advance()?;

        self.expect(Token::Colon)?;
        let value = self.parse_value()?;

        Ok(AnnotatedField {
            annotation,
            key,
            value,
        })
    }

    /// Comma-separated values up to and including `close`.
    fn parse_sequence(&mut self, close: Token, trailing_comma: bool) -> Result<Vec<Expr>, ParseError> {
        let mut elements = vec![];

        while !self.check(&close) {
            elements.push(self.parse_value()?);

            if !self.check(&close) {
                self.expect(Token::Comma)?;
                if !trailing_comma && self.check(&close) {
                    return Err(self.unexpected("a value"));
                }
            }
        }

        self.expect(close)?;
        Ok(elements)
    }

    /// Parse a complete template: exactly one value followed by end of input.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_value()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}

/// Parse template source into its syntax tree.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(source))?.parse()
}
