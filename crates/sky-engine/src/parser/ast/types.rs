//! Type annotation AST nodes
//!
//! The annotation grammar is small and recursive:
//! `int` (basic), `*T` (pointer), `[T]` (list), `{K: V}` (dict).

use std::fmt;

use crate::parser::token::Token;

/// A type annotation as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    /// Named type: int, float, string, bool, any, void, or a class name
    Basic { token: Token, name: String },

    /// Pointer type: *T
    Pointer {
        token: Token,
        pointee: Box<TypeAnnotation>,
    },

    /// List type: [T]
    List {
        token: Token,
        element: Box<TypeAnnotation>,
    },

    /// Dict type: {K: V}
    Dict {
        token: Token,
        key: Box<TypeAnnotation>,
        value: Box<TypeAnnotation>,
    },
}

impl TypeAnnotation {
    pub fn token(&self) -> &Token {
        match self {
            TypeAnnotation::Basic { token, .. }
            | TypeAnnotation::Pointer { token, .. }
            | TypeAnnotation::List { token, .. }
            | TypeAnnotation::Dict { token, .. } => token,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::Basic { name, .. } => f.write_str(name),
            TypeAnnotation::Pointer { pointee, .. } => write!(f, "*{}", pointee),
            TypeAnnotation::List { element, .. } => write!(f, "[{}]", element),
            TypeAnnotation::Dict { key, value, .. } => write!(f, "{{{}: {}}}", key, value),
        }
    }
}
