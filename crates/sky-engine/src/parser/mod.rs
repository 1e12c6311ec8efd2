//! Sky front end: lexer, parser, type system and semantic checker.
//!
//! # Example
//!
//! ```ignore
//! use sky_engine::parser::{Parser, TypeChecker};
//!
//! let source = "function add(a: int, b: int): int\n    return a + b\nend\n";
//! let (program, errors) = Parser::new(source, "add.sky").parse();
//! assert!(errors.is_empty());
//!
//! let result = TypeChecker::new().check(&program);
//! for err in &result.errors {
//!     eprintln!("{}", err.render(&program.file));
//! }
//! ```

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;

// Type system
pub mod types;

// Semantic checker
pub mod checker;

// Re-exports for convenience
pub use token::{Span, Token, TokenKind};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser};

pub use types::{ClassId, Type, TypeContext};

pub use checker::{CheckError, CheckResult, SymbolTable, TypeChecker};
