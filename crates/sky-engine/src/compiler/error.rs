//! Compilation errors

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    /// Construct that parses and type-checks but has no bytecode lowering
    #[error("{position}: {feature} is not supported by the bytecode compiler")]
    Unsupported { feature: String, position: String },

    #[error("{position}: invalid assignment target: {target}")]
    InvalidAssignmentTarget { target: String, position: String },

    #[error("{position}: {keyword} outside of a loop")]
    InvalidLoopControl {
        keyword: &'static str,
        position: String,
    },

    #[error("{position}: {name}() expects {expected} arguments, got {got}")]
    BuiltinArity {
        name: &'static str,
        expected: &'static str,
        got: usize,
        position: String,
    },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },

    #[error("Bytecode verification failed: {message}")]
    Verification { message: String },
}
