//! Type annotation parsing
//!
//! ```text
//! type := IDENT | '*' type | '[' type ']' | '{' type ':' type '}'
//! ```

use super::guards::nested;
use super::{ParseError, Parser};
use crate::parser::ast::TypeAnnotation;
use crate::parser::token::TokenKind;

/// Parse a type annotation starting at the current token.
pub fn parse_type_annotation(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    nested(parser, parse_type_inner)
}

fn parse_type_inner(parser: &mut Parser<'_>) -> Result<TypeAnnotation, ParseError> {
    match parser.current().kind {
        TokenKind::Ident => {
            let token = parser.advance();
            let name = token.literal.clone();
            Ok(TypeAnnotation::Basic { token, name })
        }
        TokenKind::Star => {
            let token = parser.advance();
            let pointee = parse_type_annotation(parser)?;
            Ok(TypeAnnotation::Pointer {
                token,
                pointee: Box::new(pointee),
            })
        }
        TokenKind::LBracket => {
            let token = parser.advance();
            let element = parse_type_annotation(parser)?;
            parser.expect(TokenKind::RBracket)?;
            Ok(TypeAnnotation::List {
                token,
                element: Box::new(element),
            })
        }
        TokenKind::LBrace => {
            let token = parser.advance();
            let key = parse_type_annotation(parser)?;
            parser.expect(TokenKind::Colon)?;
            let value = parse_type_annotation(parser)?;
            parser.expect(TokenKind::RBrace)?;
            Ok(TypeAnnotation::Dict {
                token,
                key: Box::new(key),
                value: Box::new(value),
            })
        }
        _ => Err(ParseError::unexpected_token(parser.current())),
    }
}

/// Parse `: T` if the current token is a colon.
pub fn parse_optional_annotation(
    parser: &mut Parser<'_>,
) -> Result<Option<TypeAnnotation>, ParseError> {
    if parser.eat(TokenKind::Colon) {
        parse_type_annotation(parser).map(Some)
    } else {
        Ok(None)
    }
}
