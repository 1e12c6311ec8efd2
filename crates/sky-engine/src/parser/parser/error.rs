//! Parse error types and error reporting

use std::rc::Rc;

use thiserror::Error;

use crate::parser::token::{Span, Token, TokenKind};

/// A syntax error with location information.
///
/// Renders as `file:line:col: message`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Human-readable error message
    pub message: String,

    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,

    /// Source location of the offending token
    pub span: Span,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A specific token was required but another one was found
    ExpectedToken { expected: TokenKind, found: TokenKind },

    /// No expression can start with this token
    NoPrefixParse { found: TokenKind },

    /// Token is valid somewhere, but not here
    UnexpectedToken { found: TokenKind },

    /// Numeric literal that does not fit its type
    InvalidNumber { literal: String },

    /// Nesting went deeper than the parser allows
    DepthLimitExceeded { limit: usize },
}

impl ParseError {
    fn at(token: &Token, kind: ParseErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            file: token.file.clone(),
            line: token.span.line,
            column: token.span.column,
            span: token.span,
        }
    }

    /// `expected next token to be X, got Y instead`
    pub fn expected_token(expected: TokenKind, found: &Token) -> Self {
        let message = format!(
            "expected next token to be {}, got {} instead",
            expected, found.kind
        );
        Self::at(
            found,
            ParseErrorKind::ExpectedToken {
                expected,
                found: found.kind,
            },
            message,
        )
    }

    /// `no prefix parse function for X found`
    pub fn no_prefix_parse(found: &Token) -> Self {
        let message = format!("no prefix parse function for {} found", found.kind);
        Self::at(
            found,
            ParseErrorKind::NoPrefixParse { found: found.kind },
            message,
        )
    }

    /// `unexpected token X`
    pub fn unexpected_token(found: &Token) -> Self {
        let message = format!("unexpected token {}", found.kind);
        Self::at(
            found,
            ParseErrorKind::UnexpectedToken { found: found.kind },
            message,
        )
    }

    pub fn invalid_number(token: &Token, type_name: &str) -> Self {
        let message = format!("could not parse {:?} as {}", token.literal, type_name);
        Self::at(
            token,
            ParseErrorKind::InvalidNumber {
                literal: token.literal.clone(),
            },
            message,
        )
    }

    pub fn depth_limit_exceeded(token: &Token, limit: usize) -> Self {
        let message = format!("maximum nesting depth ({}) exceeded", limit);
        Self::at(token, ParseErrorKind::DepthLimitExceeded { limit }, message)
    }

    /// A hint for fixing this error, if there is an obvious one.
    pub fn hint(&self) -> Option<&'static str> {
        match &self.kind {
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::End,
                ..
            } => Some("close the block with `end`"),
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::Newline,
                ..
            } => Some("put each statement on its own line"),
            ParseErrorKind::NoPrefixParse {
                found: TokenKind::Illegal,
            } => Some("fix the lexical error reported for this position first"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, literal: &str) -> Token {
        Token::new(kind, literal, Span::new(4, 5, 2, 3), Rc::from("demo.sky"))
    }

    #[test]
    fn test_expected_token_message() {
        let err = ParseError::expected_token(TokenKind::Ident, &token(TokenKind::Int, "5"));
        assert_eq!(
            err.to_string(),
            "demo.sky:2:3: expected next token to be IDENT, got INT instead"
        );
    }

    #[test]
    fn test_no_prefix_message() {
        let err = ParseError::no_prefix_parse(&token(TokenKind::RParen, ")"));
        assert_eq!(err.message, "no prefix parse function for ) found");
        assert_eq!(err.hint(), None);
    }
}
