//! Abstract Syntax Tree (AST) for the Sky programming language.
//!
//! This module defines the complete AST structure for Sky:
//! - the [`Program`] root
//! - statements (declarations, control flow, blocks)
//! - expressions (literals, operators, calls, match, lambdas)
//! - type annotations
//!
//! Every node keeps the token it originated from, so later stages can report
//! `file:line:col` positions. The tree is strictly owned: no sharing, no cycles.

use std::fmt;

use crate::parser::token::Token;

pub mod expression;
pub mod statement;
pub mod types;

pub use expression::*;
pub use statement::*;
pub use types::*;

/// Root node: one Sky source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level statements in source order
    pub statements: Vec<Statement>,

    /// Source name the program was parsed from
    pub file: String,
}

impl Program {
    pub fn new(statements: Vec<Statement>, file: impl Into<String>) -> Self {
        Self {
            statements,
            file: file.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Find a top-level function declaration by name.
    pub fn function(&self, name: &str) -> Option<&FunctionStatement> {
        self.statements.iter().find_map(|stmt| match stmt {
            Statement::Function(func) if func.name.name == name => Some(func),
            _ => None,
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

/// A name for a variable, function, class, parameter, etc.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let name = token.literal.clone();
        Self { token, name }
    }

    /// `_` is the wildcard pattern in match arms.
    pub fn is_wildcard(&self) -> bool {
        self.name == "_"
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Join displayable items with `", "`.
pub(crate) fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
