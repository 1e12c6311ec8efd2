//! Sky Language Engine
//!
//! This crate provides the complete Sky language pipeline:
//! - **Parser**: Lexer, parser, type system and semantic checker (`parser` module)
//! - **Compiler**: Bytecode model, code generation and disassembly (`compiler` module)
//! - **VM**: Stack-based interpreter (`vm` module)
//! - **Diagnostics**: Source-context rendering of front-end errors (`diagnostic` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use sky_engine::{compile, check_program, Parser, Vm};
//!
//! let source = "function add(a, b)\n    return a + b\nend\nprint(add(2, 3))\n";
//!
//! let (program, errors) = Parser::new(source, "add.sky").parse();
//! assert!(errors.is_empty());
//! assert!(check_program(&program).is_empty());
//!
//! let bytecode = compile(&program).unwrap();
//! Vm::default().run(&bytecode).unwrap();
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Parser module: Lexer, parser, types, and semantic checker
pub mod parser;

/// Compiler module: bytecode model and code generation
pub mod compiler;

/// VM module: values, frames, and the interpreter
pub mod vm;

/// Rendering of lex, parse and check errors with source context
pub mod diagnostic;

// ============================================================================
// Re-exports from Parser
// ============================================================================

pub use parser::{
    // Lexer
    Lexer, LexError, Token, TokenKind, Span,
    // Parser
    Parser, ParseError, ParseErrorKind,
    // Types
    Type, TypeContext,
    // Checker
    TypeChecker, CheckError, CheckResult, SymbolTable,
    // AST
    ast,
};
pub use parser::checker::check_program;

// ============================================================================
// Re-exports from Compiler
// ============================================================================

pub use compiler::{
    compile, verify_bytecode, Bytecode, CompileError, CompileOptions, CompileResult,
    CompiledFunction, Compiler, Constant, Instruction, Opcode, VerifyError,
};

// ============================================================================
// Re-exports from VM
// ============================================================================

pub use vm::{CaptureBuffer, Value, Vm, VmError, VmOptions, VmResult};

pub use diagnostic::{Diagnostic, SourceFiles};
