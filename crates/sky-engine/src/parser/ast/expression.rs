//! Expression AST nodes
//!
//! This module defines all expression types in the Sky language:
//! - literals (numbers, strings, booleans, lists, dicts)
//! - prefix and infix operators, including assignment
//! - calls, indexing and member access
//! - await / yield
//! - match, enum constructors and lambdas

use std::fmt;

use super::{join, Identifier, Parameter, TypeAnnotation};
use crate::parser::token::{Token, TokenKind};

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Identifier: x, self
    Identifier(Identifier),

    /// Integer literal: 42, 0xFF, 0b1010
    Integer(IntegerLiteral),

    /// Float literal: 3.14, 1.0e10
    Float(FloatLiteral),

    /// String literal: "hello", 'world'
    String(StringLiteral),

    /// Boolean literal: true, false
    Boolean(BooleanLiteral),

    /// List literal: [1, 2, 3]
    List(ListLiteral),

    /// Dict literal: {"a": 1}
    Dict(DictLiteral),

    /// Prefix expression: !x, -y, not z
    Prefix(PrefixExpression),

    /// Infix expression: x + y, a && b, x = 1, y += 2
    Infix(InfixExpression),

    /// Function call: add(1, 2)
    Call(CallExpression),

    /// Index access: xs[0]
    Index(IndexExpression),

    /// Member access: point.x
    Member(MemberExpression),

    /// Await: await fetch()
    Await(AwaitExpression),

    /// Yield: yield value
    Yield(YieldExpression),

    /// Match: match x ... end
    Match(MatchExpression),

    /// Enum construction: Color.Red, Shape.Circle(2.0)
    EnumConstructor(EnumConstructorExpression),

    /// Lambda: function(x) x * 2 end
    Lambda(LambdaExpression),
}

impl Expression {
    /// The token this expression originated from.
    pub fn token(&self) -> &Token {
        match self {
            Expression::Identifier(e) => &e.token,
            Expression::Integer(e) => &e.token,
            Expression::Float(e) => &e.token,
            Expression::String(e) => &e.token,
            Expression::Boolean(e) => &e.token,
            Expression::List(e) => &e.token,
            Expression::Dict(e) => &e.token,
            Expression::Prefix(e) => &e.token,
            Expression::Infix(e) => &e.token,
            Expression::Call(e) => &e.token,
            Expression::Index(e) => &e.token,
            Expression::Member(e) => &e.token,
            Expression::Await(e) => &e.token,
            Expression::Yield(e) => &e.token,
            Expression::Match(e) => &e.token,
            Expression::EnumConstructor(e) => &e.token,
            Expression::Lambda(e) => &e.token,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::Integer(_)
                | Expression::Float(_)
                | Expression::String(_)
                | Expression::Boolean(_)
        )
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(ident) => Some(ident),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(e) => write!(f, "{}", e),
            Expression::Integer(e) => f.write_str(&e.token.literal),
            Expression::Float(e) => f.write_str(&e.token.literal),
            Expression::String(e) => write!(f, "{:?}", e.value),
            Expression::Boolean(e) => write!(f, "{}", e.value),
            Expression::List(e) => write!(f, "[{}]", join(&e.elements)),
            Expression::Dict(e) => {
                let pairs: Vec<String> = e
                    .pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expression::Prefix(e) => write!(f, "({}{})", e.operator, e.right),
            Expression::Infix(e) => write!(f, "({} {} {})", e.left, e.operator, e.right),
            Expression::Call(e) => write!(f, "{}({})", e.function, join(&e.arguments)),
            Expression::Index(e) => write!(f, "({}[{}])", e.left, e.index),
            Expression::Member(e) => write!(f, "{}.{}", e.object, e.member),
            Expression::Await(e) => write!(f, "(await {})", e.value),
            Expression::Yield(e) => match &e.value {
                Some(value) => write!(f, "(yield {})", value),
                None => f.write_str("(yield)"),
            },
            Expression::Match(e) => {
                write!(f, "match {} {{", e.subject)?;
                for (i, arm) in e.arms.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}{} => {}", sep, arm.pattern, arm.body)?;
                }
                f.write_str(" }")
            }
            Expression::EnumConstructor(e) => {
                write!(f, "{}.{}", e.enum_name, e.variant)?;
                if !e.arguments.is_empty() {
                    write!(f, "({})", join(&e.arguments))?;
                }
                Ok(())
            }
            Expression::Lambda(e) => {
                write!(f, "function({}) {} end", join(&e.parameters), e.body)
            }
        }
    }
}

/// Integer literal
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

/// Float literal
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub token: Token,
    pub value: f64,
}

/// String literal (escape sequences already resolved)
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
    pub value: String,
}

/// Boolean literal
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

/// List literal: [a, b, c]
#[derive(Debug, Clone, PartialEq)]
pub struct ListLiteral {
    pub token: Token,
    pub elements: Vec<Expression>,
}

/// Dict literal: {k: v, ...}, pairs kept in source order
#[derive(Debug, Clone, PartialEq)]
pub struct DictLiteral {
    pub token: Token,
    pub pairs: Vec<(Expression, Expression)>,
}

/// Prefix expression
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: PrefixOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Not,    // !, not
    Negate, // -
    Plus,   // +
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOperator::Not => "!",
            PrefixOperator::Negate => "-",
            PrefixOperator::Plus => "+",
        })
    }
}

/// Infix expression. Assignment is an infix operator too; only an identifier
/// target is valid, which the checker and compiler enforce.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub operator: InfixOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    // Arithmetic
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
    Modulo,   // %
    Power,    // **

    // Comparison
    Equal,        // ==
    NotEqual,     // !=
    LessThan,     // <
    LessEqual,    // <=
    GreaterThan,  // >
    GreaterEqual, // >=

    // Logical
    And, // &&, and
    Or,  // ||, or

    // Assignment
    Assign,         // =
    AddAssign,      // +=
    SubtractAssign, // -=
    MultiplyAssign, // *=
    DivideAssign,   // /=
    ModuloAssign,   // %=
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => InfixOperator::Add,
            TokenKind::Minus => InfixOperator::Subtract,
            TokenKind::Star => InfixOperator::Multiply,
            TokenKind::Slash => InfixOperator::Divide,
            TokenKind::Percent => InfixOperator::Modulo,
            TokenKind::Power => InfixOperator::Power,
            TokenKind::Eq => InfixOperator::Equal,
            TokenKind::NotEq => InfixOperator::NotEqual,
            TokenKind::Lt => InfixOperator::LessThan,
            TokenKind::LtEq => InfixOperator::LessEqual,
            TokenKind::Gt => InfixOperator::GreaterThan,
            TokenKind::GtEq => InfixOperator::GreaterEqual,
            TokenKind::AndAnd | TokenKind::And => InfixOperator::And,
            TokenKind::OrOr | TokenKind::Or => InfixOperator::Or,
            TokenKind::Assign => InfixOperator::Assign,
            TokenKind::PlusEq => InfixOperator::AddAssign,
            TokenKind::MinusEq => InfixOperator::SubtractAssign,
            TokenKind::StarEq => InfixOperator::MultiplyAssign,
            TokenKind::SlashEq => InfixOperator::DivideAssign,
            TokenKind::PercentEq => InfixOperator::ModuloAssign,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            InfixOperator::Assign
                | InfixOperator::AddAssign
                | InfixOperator::SubtractAssign
                | InfixOperator::MultiplyAssign
                | InfixOperator::DivideAssign
                | InfixOperator::ModuloAssign
        )
    }

    /// For compound assignment, the arithmetic operator applied before storing.
    pub fn compound_operator(&self) -> Option<InfixOperator> {
        match self {
            InfixOperator::AddAssign => Some(InfixOperator::Add),
            InfixOperator::SubtractAssign => Some(InfixOperator::Subtract),
            InfixOperator::MultiplyAssign => Some(InfixOperator::Multiply),
            InfixOperator::DivideAssign => Some(InfixOperator::Divide),
            InfixOperator::ModuloAssign => Some(InfixOperator::Modulo),
            _ => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            InfixOperator::Equal
                | InfixOperator::NotEqual
                | InfixOperator::LessThan
                | InfixOperator::LessEqual
                | InfixOperator::GreaterThan
                | InfixOperator::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, InfixOperator::And | InfixOperator::Or)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::Modulo => "%",
            InfixOperator::Power => "**",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::LessThan => "<",
            InfixOperator::LessEqual => "<=",
            InfixOperator::GreaterThan => ">",
            InfixOperator::GreaterEqual => ">=",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
            InfixOperator::Assign => "=",
            InfixOperator::AddAssign => "+=",
            InfixOperator::SubtractAssign => "-=",
            InfixOperator::MultiplyAssign => "*=",
            InfixOperator::DivideAssign => "/=",
            InfixOperator::ModuloAssign => "%=",
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Function call: callee(args)
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// The `(` token
    pub token: Token,
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

impl CallExpression {
    /// Name of the callee when it is a plain identifier.
    pub fn callee_name(&self) -> Option<&str> {
        self.function.as_identifier().map(|ident| ident.name.as_str())
    }
}

/// Index access: left[index]
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    /// The `[` token
    pub token: Token,
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

/// Member access: object.member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    /// The `.` token
    pub token: Token,
    pub object: Box<Expression>,
    pub member: Identifier,
}

/// Await expression
#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpression {
    pub token: Token,
    pub value: Box<Expression>,
}

/// Yield expression; the value is optional
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpression {
    pub token: Token,
    pub value: Option<Box<Expression>>,
}

/// Match expression
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpression {
    pub token: Token,
    pub subject: Box<Expression>,
    pub arms: Vec<MatchArm>,
}

/// One `pattern => body` arm
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Expression,
    pub body: Expression,
}

impl MatchArm {
    pub fn is_wildcard(&self) -> bool {
        matches!(&self.pattern, Expression::Identifier(ident) if ident.is_wildcard())
    }
}

/// Enum constructor: Enum.Variant or Enum.Variant(args)
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstructorExpression {
    /// The variant name token
    pub token: Token,
    pub enum_name: String,
    pub variant: String,
    pub arguments: Vec<Expression>,
}

/// Lambda: function(params)[: T] expr end
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub token: Token,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Box<Expression>,
}
