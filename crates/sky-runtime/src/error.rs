//! Runtime error types.

use sky_engine::compiler::CompileError;
use sky_engine::vm::VmError;

use crate::manifest::ManifestError;

/// Errors that can occur during compilation, loading, or execution.
///
/// Front-end stages report every error they find; their payload is the
/// rendered errors joined by newlines.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Lexer error
    #[error("Lexer error: {0}")]
    Lex(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Semantic check error
    #[error("Type error: {0}")]
    TypeCheck(String),

    /// Bytecode compilation error
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Bytecode decoding or verification error
    #[error("Bytecode error: {0}")]
    Bytecode(String),

    /// VM execution error
    #[error("Runtime error: {0}")]
    Vm(#[from] VmError),

    /// Invalid sky.toml
    #[error("{0}")]
    Manifest(#[from] ManifestError),
}

impl RuntimeError {
    /// Whether the program failed while running, as opposed to before.
    pub fn is_runtime(&self) -> bool {
        matches!(self, RuntimeError::Vm(_))
    }
}
