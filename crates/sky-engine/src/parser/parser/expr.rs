//! Expression parsing
//!
//! Precedence climbing: each token kind has at most one prefix handler
//! ([`parse_prefix`]) and at most one infix handler ([`parse_infix`]); the
//! loop in [`parse_expression_with`] keeps consuming infix operators whose
//! precedence exceeds the bound passed down.

use super::guards::nested;
use super::precedence::{infix_precedence, is_right_associative, Precedence};
use super::stmt::parse_parameters;
use super::types::parse_optional_annotation;
use super::{ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::lexer::{parse_float_literal, parse_int_literal};
use crate::parser::token::TokenKind;

/// Parse a full expression.
pub fn parse_expression(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    parse_expression_with(parser, Precedence::Lowest)
}

/// Parse an expression whose operators all bind tighter than `precedence`.
pub fn parse_expression_with(
    parser: &mut Parser<'_>,
    precedence: Precedence,
) -> Result<Expression, ParseError> {
    nested(parser, |parser| {
        let mut left = parse_prefix(parser)?;
        while precedence < infix_precedence(parser.current().kind) {
            left = parse_infix(parser, left)?;
        }
        Ok(left)
    })
}

// ============================================================================
// Prefix Handlers
// ============================================================================

fn parse_prefix(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    match parser.current().kind {
        TokenKind::Ident | TokenKind::SelfKw | TokenKind::Super => {
            let token = parser.advance();
            Ok(Expression::Identifier(Identifier::new(token)))
        }
        TokenKind::Int => {
            let token = parser.advance();
            let value = parse_int_literal(&token.literal)
                .ok_or_else(|| ParseError::invalid_number(&token, "integer"))?;
            Ok(Expression::Integer(IntegerLiteral { token, value }))
        }
        TokenKind::Float => {
            let token = parser.advance();
            let value = parse_float_literal(&token.literal)
                .ok_or_else(|| ParseError::invalid_number(&token, "float"))?;
            Ok(Expression::Float(FloatLiteral { token, value }))
        }
        TokenKind::String => {
            let token = parser.advance();
            let value = token.literal.clone();
            Ok(Expression::String(StringLiteral { token, value }))
        }
        TokenKind::True | TokenKind::False => {
            let token = parser.advance();
            let value = token.kind == TokenKind::True;
            Ok(Expression::Boolean(BooleanLiteral { token, value }))
        }
        TokenKind::Bang | TokenKind::Not | TokenKind::Minus | TokenKind::Plus => {
            parse_prefix_operator(parser)
        }
        TokenKind::LParen => parse_grouped(parser),
        TokenKind::LBracket => parse_list_literal(parser),
        TokenKind::LBrace => parse_dict_literal(parser),
        TokenKind::Await => {
            let token = parser.advance();
            let value = parse_expression_with(parser, Precedence::Prefix)?;
            Ok(Expression::Await(AwaitExpression {
                token,
                value: Box::new(value),
            }))
        }
        TokenKind::Yield => parse_yield(parser),
        TokenKind::Match => parse_match(parser),
        TokenKind::Function => parse_lambda(parser),
        _ => Err(ParseError::no_prefix_parse(parser.current())),
    }
}

fn parse_prefix_operator(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let operator = match token.kind {
        TokenKind::Minus => PrefixOperator::Negate,
        TokenKind::Plus => PrefixOperator::Plus,
        _ => PrefixOperator::Not,
    };
    let right = parse_expression_with(parser, Precedence::Prefix)?;
    Ok(Expression::Prefix(PrefixExpression {
        token,
        operator,
        right: Box::new(right),
    }))
}

fn parse_grouped(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    parser.expect(TokenKind::LParen)?;
    let expr = parse_expression(parser)?;
    parser.expect(TokenKind::RParen)?;
    Ok(expr)
}

fn parse_list_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.expect(TokenKind::LBracket)?;
    let elements = parse_expression_list(parser, TokenKind::RBracket)?;
    Ok(Expression::List(ListLiteral { token, elements }))
}

fn parse_dict_literal(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.expect(TokenKind::LBrace)?;
    let mut pairs = Vec::new();

    while !parser.check(TokenKind::RBrace) {
        let key = parse_expression(parser)?;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expression(parser)?;
        pairs.push((key, value));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::RBrace)?;
    Ok(Expression::Dict(DictLiteral { token, pairs }))
}

/// Parse `a, b, c` up to and including `close`. A trailing comma is allowed.
pub(super) fn parse_expression_list(
    parser: &mut Parser<'_>,
    close: TokenKind,
) -> Result<Vec<Expression>, ParseError> {
    let mut items = Vec::new();

    while !parser.check(close) {
        items.push(parse_expression(parser)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(close)?;
    Ok(items)
}

fn parse_yield(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let has_value = !parser.check_any(&[
        TokenKind::Newline,
        TokenKind::Eof,
        TokenKind::Dedent,
        TokenKind::End,
        TokenKind::RParen,
        TokenKind::RBracket,
        TokenKind::RBrace,
        TokenKind::Comma,
    ]);
    let value = if has_value {
        Some(Box::new(parse_expression(parser)?))
    } else {
        None
    };
    Ok(Expression::Yield(YieldExpression { token, value }))
}

/// ```text
/// match subject
///     pattern => expr
///     _ => expr
/// end
/// ```
fn parse_match(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let subject = parse_expression(parser)?;

    parser.expect(TokenKind::Newline)?;
    while parser.eat(TokenKind::Newline) {}

    let mut arms = Vec::new();
    if parser.eat(TokenKind::Indent) {
        while !parser.check_any(&[TokenKind::Dedent, TokenKind::End, TokenKind::Eof]) {
            if parser.eat(TokenKind::Newline) {
                continue;
            }

            // Patterns stop before `=>`; assignment is not a pattern
            let pattern = parse_expression_with(parser, Precedence::Assign)?;
            parser.expect(TokenKind::Arrow)?;
            let body = parse_expression(parser)?;
            arms.push(MatchArm { pattern, body });

            if !parser.check_any(&[TokenKind::Dedent, TokenKind::End, TokenKind::Eof]) {
                parser.expect(TokenKind::Newline)?;
            }
        }
        parser.eat(TokenKind::Dedent);
    }

    parser.expect(TokenKind::End)?;
    Ok(Expression::Match(MatchExpression {
        token,
        subject: Box::new(subject),
        arms,
    }))
}

/// `function(params)[: T] expr end`
fn parse_lambda(parser: &mut Parser<'_>) -> Result<Expression, ParseError> {
    let token = parser.advance();
    let parameters = parse_parameters(parser)?;
    let return_type = parse_optional_annotation(parser)?;
    let body = parse_expression(parser)?;
    parser.expect(TokenKind::End)?;

    Ok(Expression::Lambda(LambdaExpression {
        token,
        parameters,
        return_type,
        body: Box::new(body),
    }))
}

// ============================================================================
// Infix Handlers
// ============================================================================

fn parse_infix(parser: &mut Parser<'_>, left: Expression) -> Result<Expression, ParseError> {
    match parser.current().kind {
        TokenKind::LParen => parse_call(parser, left),
        TokenKind::LBracket => parse_index(parser, left),
        TokenKind::Dot => parse_member(parser, left),
        _ => parse_binary(parser, left),
    }
}

fn parse_binary(parser: &mut Parser<'_>, left: Expression) -> Result<Expression, ParseError> {
    let kind = parser.current().kind;
    let operator = InfixOperator::from_token(kind)
        .ok_or_else(|| ParseError::unexpected_token(parser.current()))?;
    let token = parser.advance();

    let precedence = infix_precedence(kind);
    let right_bound = if is_right_associative(kind) {
        precedence.lower()
    } else {
        precedence
    };
    let right = parse_expression_with(parser, right_bound)?;

    Ok(Expression::Infix(InfixExpression {
        token,
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }))
}

fn parse_call(parser: &mut Parser<'_>, function: Expression) -> Result<Expression, ParseError> {
    let token = parser.expect(TokenKind::LParen)?;
    let arguments = parse_expression_list(parser, TokenKind::RParen)?;
    Ok(Expression::Call(CallExpression {
        token,
        function: Box::new(function),
        arguments,
    }))
}

fn parse_index(parser: &mut Parser<'_>, left: Expression) -> Result<Expression, ParseError> {
    let token = parser.expect(TokenKind::LBracket)?;
    let index = parse_expression(parser)?;
    parser.expect(TokenKind::RBracket)?;
    Ok(Expression::Index(IndexExpression {
        token,
        left: Box::new(left),
        index: Box::new(index),
    }))
}

/// `object.member`, or `Enum.Variant[(args)]` when the object names a declared enum.
fn parse_member(parser: &mut Parser<'_>, object: Expression) -> Result<Expression, ParseError> {
    let token = parser.expect(TokenKind::Dot)?;
    let member = parser.expect_identifier()?;

    let enum_name = match &object {
        Expression::Identifier(ident) if parser.is_enum(&ident.name) => Some(ident.name.clone()),
        _ => None,
    };

    if let Some(enum_name) = enum_name {
        let arguments = if parser.eat(TokenKind::LParen) {
            parse_expression_list(parser, TokenKind::RParen)?
        } else {
            Vec::new()
        };
        return Ok(Expression::EnumConstructor(EnumConstructorExpression {
            token: member.token,
            enum_name,
            variant: member.name,
            arguments,
        }));
    }

    Ok(Expression::Member(MemberExpression {
        token,
        object: Box::new(object),
        member,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> String {
        let mut parser = Parser::new(source, "test.sky");
        parse_expression(&mut parser).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(expr("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(expr("1 * 2 + 3"), "((1 * 2) + 3)");
        assert_eq!(expr("a || b && c"), "(a || (b && c))");
        assert_eq!(expr("a < b == c > d"), "((a < b) == (c > d))");
    }

    #[test]
    fn test_right_associative_operators() {
        assert_eq!(expr("2 ** 3 ** 2"), "(2 ** (3 ** 2))");
        assert_eq!(expr("a = b = 1"), "(a = (b = 1))");
        assert_eq!(expr("x += 1 + 2"), "(x += (1 + 2))");
    }

    #[test]
    fn test_prefix_binds_tighter_than_infix() {
        assert_eq!(expr("-a * b"), "((-a) * b)");
        assert_eq!(expr("not a and b"), "((!a) && b)");
    }

    #[test]
    fn test_postfix_chains() {
        assert_eq!(expr("f(1, 2)[0]"), "(f(1, 2)[0])");
        assert_eq!(expr("a.b.c(d)"), "a.b.c(d)");
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("[1, 2, 3,]"), "[1, 2, 3]");
        assert_eq!(expr("{\"a\": 1, \"b\": 2}"), "{\"a\": 1, \"b\": 2}");
        assert_eq!(expr("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn test_lambda() {
        assert_eq!(expr("function(x) x * 2 end"), "function(x) (x * 2) end");
    }

    #[test]
    fn test_no_prefix_error() {
        let mut parser = Parser::new(")", "test.sky");
        let err = parse_expression(&mut parser).unwrap_err();
        assert_eq!(err.message, "no prefix parse function for ) found");
    }
}
