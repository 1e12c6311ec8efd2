//! Sky semantic checker
//!
//! This module provides:
//! - Symbol tables with scope management
//! - Builtin function signatures
//! - Type inference and checking for expressions and statements
//!
//! The checker is advisory: it never mutates the AST, and downstream stages
//! refuse to run while it reports errors.

pub mod builtins;
pub mod checker;
pub mod error;
pub mod symbols;

pub use builtins::{builtin_signature, is_builtin, BUILTIN_FUNCTIONS};
pub use checker::{check_program, CheckResult, TypeChecker};
pub use error::CheckError;
pub use symbols::{Scope, ScopeId, ScopeKind, Symbol, SymbolFlags, SymbolKind, SymbolTable};
