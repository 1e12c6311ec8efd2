//! Statement parsing
//!
//! Blocks are either indented (`NEWLINE INDENT ... DEDENT`) or written inline
//! on the header line; both forms are closed by the construct's `end` (or by
//! `elif` / `else` / `catch` / `finally` where those continue it).

use super::expr::{parse_expression, parse_expression_list};
use super::guards::nested;
use super::types::{parse_optional_annotation, parse_type_annotation};
use super::{ParseError, Parser};
use crate::parser::ast::*;
use crate::parser::token::TokenKind;

/// Tokens that end a statement without being part of it.
const STATEMENT_CLOSERS: &[TokenKind] = &[
    TokenKind::Eof,
    TokenKind::Dedent,
    TokenKind::End,
    TokenKind::Elif,
    TokenKind::Else,
    TokenKind::Catch,
    TokenKind::Finally,
];

/// Tokens that close an inline block.
const INLINE_CLOSERS: &[TokenKind] = &[
    TokenKind::Eof,
    TokenKind::Newline,
    TokenKind::End,
    TokenKind::Elif,
    TokenKind::Else,
    TokenKind::Catch,
    TokenKind::Finally,
];

/// Tokens that close an indented block.
const INDENTED_CLOSERS: &[TokenKind] = &[TokenKind::Eof, TokenKind::Dedent, TokenKind::End];

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    nested(parser, parse_statement_inner)
}

fn parse_statement_inner(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    match parser.current().kind {
        TokenKind::Let => parse_let(parser),
        TokenKind::Const => parse_const(parser),
        TokenKind::Return => parse_return(parser),
        TokenKind::Break => {
            let token = parser.advance();
            end_statement(parser)?;
            Ok(Statement::Break(BreakStatement { token }))
        }
        TokenKind::Continue => {
            let token = parser.advance();
            end_statement(parser)?;
            Ok(Statement::Continue(ContinueStatement { token }))
        }

        // `function(` starts a lambda expression, not a declaration
        TokenKind::Function if parser.peek_is(TokenKind::LParen) => parse_expression_statement(parser),
        TokenKind::Function | TokenKind::Async | TokenKind::Coop | TokenKind::At => {
            parse_function(parser)
        }

        TokenKind::If => parse_if(parser),
        TokenKind::While => parse_while(parser),
        TokenKind::For => parse_for(parser),
        TokenKind::Class => parse_class(parser),
        TokenKind::Import => parse_import(parser),
        TokenKind::Unsafe => parse_unsafe(parser),
        TokenKind::Enum => parse_enum(parser),
        TokenKind::Try => parse_try(parser),
        TokenKind::Throw => {
            let token = parser.advance();
            let value = parse_expression(parser)?;
            end_statement(parser)?;
            Ok(Statement::Throw(ThrowStatement { token, value }))
        }

        // An over-indented run of lines forms a nested block
        TokenKind::Indent => {
            let token = parser.advance();
            let statements = parse_statements_until(parser, INDENTED_CLOSERS, true);
            parser.eat(TokenKind::Dedent);
            Ok(Statement::Block(BlockStatement { token, statements }))
        }

        _ => parse_expression_statement(parser),
    }
}

/// A simple statement ends at NEWLINE (consumed) or in front of a block closer.
fn end_statement(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    if parser.eat(TokenKind::Newline) || parser.check_any(STATEMENT_CLOSERS) {
        Ok(())
    } else {
        Err(ParseError::expected_token(TokenKind::Newline, parser.current()))
    }
}

fn parse_expression_statement(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.current().clone();
    let expression = parse_expression(parser)?;
    end_statement(parser)?;
    Ok(Statement::Expression(ExpressionStatement { token, expression }))
}

// ============================================================================
// Blocks
// ============================================================================

/// Parse statements until one of `closers`; errors are recorded and skipped.
fn parse_statements_until(
    parser: &mut Parser<'_>,
    closers: &[TokenKind],
    skip_newlines: bool,
) -> Vec<Statement> {
    let mut statements = Vec::new();

    loop {
        if skip_newlines {
            while parser.eat(TokenKind::Newline) {}
        }
        if parser.check_any(closers) {
            return statements;
        }

        let before = parser.consumed();
        match parse_statement(parser) {
            Ok(stmt) => statements.push(stmt),
            Err(err) => {
                parser.push_error(err);
                parser.recover(before);
            }
        }
    }
}

/// Parse a block body. The closing keyword is left for the caller.
pub(super) fn parse_block(parser: &mut Parser<'_>) -> Result<BlockStatement, ParseError> {
    let token = parser.current().clone();

    let statements = if parser.eat(TokenKind::Newline) {
        while parser.eat(TokenKind::Newline) {}
        if parser.eat(TokenKind::Indent) {
            let statements = parse_statements_until(parser, INDENTED_CLOSERS, true);
            parser.eat(TokenKind::Dedent);
            statements
        } else {
            // Empty body: the closer follows directly
            Vec::new()
        }
    } else {
        parse_statements_until(parser, INLINE_CLOSERS, false)
    };

    Ok(BlockStatement { token, statements })
}

/// `end` closing a compound statement, then the end of the line.
fn close_block(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    parser.expect(TokenKind::End)?;
    end_statement(parser)
}

// ============================================================================
// Variable Declarations
// ============================================================================

/// `let x[: T] [= value]`
fn parse_let(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let name = parser.expect_identifier()?;
    let type_annotation = parse_optional_annotation(parser)?;
    let value = if parser.eat(TokenKind::Assign) {
        Some(parse_expression(parser)?)
    } else {
        None
    };
    end_statement(parser)?;

    Ok(Statement::Let(LetStatement {
        token,
        name,
        type_annotation,
        value,
    }))
}

/// `const X[: T] = value`
fn parse_const(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let name = parser.expect_identifier()?;
    let type_annotation = parse_optional_annotation(parser)?;
    parser.expect(TokenKind::Assign)?;
    let value = parse_expression(parser)?;
    end_statement(parser)?;

    Ok(Statement::Const(ConstStatement {
        token,
        name,
        type_annotation,
        value,
    }))
}

fn parse_return(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let value = if parser.check(TokenKind::Newline) || parser.check_any(STATEMENT_CLOSERS) {
        None
    } else {
        Some(parse_expression(parser)?)
    };
    end_statement(parser)?;
    Ok(Statement::Return(ReturnStatement { token, value }))
}

// ============================================================================
// Functions
// ============================================================================

/// `[@decorator ...] [async|coop] function name[(params)][: T] body end`
fn parse_function(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let mut decorators = Vec::new();
    while parser.check(TokenKind::At) {
        let token = parser.advance();
        let name = parser.expect_identifier()?;
        let arguments = if parser.eat(TokenKind::LParen) {
            parse_expression_list(parser, TokenKind::RParen)?
        } else {
            Vec::new()
        };
        decorators.push(Decorator {
            token,
            name,
            arguments,
        });
        while parser.eat(TokenKind::Newline) {}
    }

    let is_async = parser.eat(TokenKind::Async);
    let is_coop = !is_async && parser.eat(TokenKind::Coop);

    let token = parser.expect(TokenKind::Function)?;
    let name = parser.expect_identifier()?;
    let parameters = if parser.check(TokenKind::LParen) {
        parse_parameters(parser)?
    } else {
        Vec::new()
    };
    let return_type = parse_optional_annotation(parser)?;
    let body = parse_block(parser)?;
    close_block(parser)?;

    Ok(Statement::Function(FunctionStatement {
        token,
        name,
        parameters,
        return_type,
        body,
        is_async,
        is_coop,
        decorators,
    }))
}

/// `(a, b: int, c = 1, ...rest)`. A variadic parameter must come last.
pub(super) fn parse_parameters(parser: &mut Parser<'_>) -> Result<Vec<Parameter>, ParseError> {
    parser.expect(TokenKind::LParen)?;
    let mut parameters = Vec::new();

    while !parser.check(TokenKind::RParen) {
        let variadic = parser.eat(TokenKind::Ellipsis);
        let name = parser.expect_identifier()?;
        let type_annotation = parse_optional_annotation(parser)?;
        let default = if !variadic && parser.eat(TokenKind::Assign) {
            Some(parse_expression(parser)?)
        } else {
            None
        };

        parameters.push(Parameter {
            token: name.token.clone(),
            name,
            type_annotation,
            default,
            variadic,
        });

        if variadic || !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::RParen)?;
    Ok(parameters)
}

// ============================================================================
// Control Flow
// ============================================================================

fn parse_if(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let condition = parse_expression(parser)?;
    let consequence = parse_block(parser)?;

    let mut elifs = Vec::new();
    while parser.check(TokenKind::Elif) {
        let token = parser.advance();
        let condition = parse_expression(parser)?;
        let consequence = parse_block(parser)?;
        elifs.push(ElifClause {
            token,
            condition,
            consequence,
        });
    }

    let alternative = if parser.eat(TokenKind::Else) {
        Some(parse_block(parser)?)
    } else {
        None
    };
    close_block(parser)?;

    Ok(Statement::If(IfStatement {
        token,
        condition,
        consequence,
        elifs,
        alternative,
    }))
}

fn parse_while(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let condition = parse_expression(parser)?;
    let body = parse_block(parser)?;
    close_block(parser)?;
    Ok(Statement::While(WhileStatement {
        token,
        condition,
        body,
    }))
}

/// `for name in iterable body end`
fn parse_for(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let iterator = parser.expect_identifier()?;
    parser.expect(TokenKind::In)?;
    let iterable = parse_expression(parser)?;
    let body = parse_block(parser)?;
    close_block(parser)?;
    Ok(Statement::For(ForStatement {
        token,
        iterator,
        iterable,
        body,
    }))
}

/// `try body [catch [name] body] [finally body] end`
fn parse_try(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let body = parse_block(parser)?;

    let catch = if parser.check(TokenKind::Catch) {
        let token = parser.advance();
        let name = if parser.check(TokenKind::Ident) {
            Some(Identifier::new(parser.advance()))
        } else {
            None
        };
        let body = parse_block(parser)?;
        Some(CatchClause { token, name, body })
    } else {
        None
    };

    let finally = if parser.eat(TokenKind::Finally) {
        Some(parse_block(parser)?)
    } else {
        None
    };
    close_block(parser)?;

    Ok(Statement::Try(TryStatement {
        token,
        body,
        catch,
        finally,
    }))
}

fn parse_unsafe(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let body = parse_block(parser)?;
    close_block(parser)?;
    Ok(Statement::Unsafe(UnsafeStatement { token, body }))
}

// ============================================================================
// Declarations
// ============================================================================

/// `class Name[(Super)] body end`
fn parse_class(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let name = parser.expect_identifier()?;
    let superclass = if parser.eat(TokenKind::LParen) {
        let superclass = parser.expect_identifier()?;
        parser.expect(TokenKind::RParen)?;
        Some(superclass)
    } else {
        None
    };
    let body = parse_block(parser)?;
    close_block(parser)?;

    Ok(Statement::Class(ClassStatement {
        token,
        name,
        superclass,
        body,
    }))
}

/// `import a.b.c [as alias]`
fn parse_import(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let mut path = vec![parser.expect_identifier()?];
    while parser.eat(TokenKind::Dot) {
        path.push(parser.expect_identifier()?);
    }
    let alias = if parser.eat(TokenKind::As) {
        Some(parser.expect_identifier()?)
    } else {
        None
    };
    end_statement(parser)?;

    Ok(Statement::Import(ImportStatement { token, path, alias }))
}

/// ```text
/// enum Name
///     Variant
///     Variant(T1, T2)
/// end
/// ```
fn parse_enum(parser: &mut Parser<'_>) -> Result<Statement, ParseError> {
    let token = parser.advance();
    let name = parser.expect_identifier()?;
    parser.declare_enum(&name.name);

    parser.expect(TokenKind::Newline)?;
    while parser.eat(TokenKind::Newline) {}

    let mut variants = Vec::new();
    if parser.eat(TokenKind::Indent) {
        while !parser.check_any(INDENTED_CLOSERS) {
            if parser.eat(TokenKind::Newline) {
                continue;
            }

            let variant = parser.expect_identifier()?;
            let mut payload = Vec::new();
            if parser.eat(TokenKind::LParen) {
                while !parser.check(TokenKind::RParen) {
                    payload.push(parse_type_annotation(parser)?);
                    if !parser.eat(TokenKind::Comma) {
                        break;
                    }
                }
                parser.expect(TokenKind::RParen)?;
            }
            variants.push(EnumVariant {
                name: variant,
                payload,
            });

            // Variants are separated by newlines or commas
            if !parser.eat(TokenKind::Comma) && !parser.check_any(INDENTED_CLOSERS) {
                parser.expect(TokenKind::Newline)?;
            }
        }
        parser.eat(TokenKind::Dedent);
    }
    close_block(parser)?;

    Ok(Statement::Enum(EnumStatement {
        token,
        name,
        variants,
    }))
}
