//! Sky virtual machine
//!
//! A single-threaded stack machine that executes [`Bytecode`]. Calls push
//! frames onto an explicit frame stack inside one dispatch loop, so script
//! recursion depth is bounded by [`VmOptions::max_frames`] rather than by
//! the host stack.
//!
//! [`Bytecode`]: crate::compiler::Bytecode

pub mod interpreter;
pub mod output;
pub mod stack;
pub mod value;

pub use interpreter::Vm;
pub use output::CaptureBuffer;
pub use stack::{CallFrame, Stack};
pub use value::{DictKey, Value};

use thiserror::Error;

/// Default limit on active call frames, the main frame included
pub const DEFAULT_MAX_FRAMES: usize = 1024;

/// Largest list `range` will materialize
pub const MAX_RANGE_LEN: usize = 10_000_000;

/// VM configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmOptions {
    /// Maximum number of simultaneously active call frames
    pub max_frames: usize,
    /// Write one trace line per executed instruction
    pub trace: bool,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            trace: false,
        }
    }
}

/// VM runtime errors
///
/// Every error is fatal to the current [`Vm::run`] call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VmError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("undefined function: {0}")]
    UndefinedFunction(String),

    #[error("function {name} expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("stack underflow")]
    StackUnderflow,

    /// Call depth exceeded the configured frame limit
    #[error("stack overflow: more than {0} call frames")]
    StackOverflow(usize),

    #[error("unsupported operands for {op}: {left} and {right}")]
    UnsupportedOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("unsupported operand for {op}: {operand}")]
    UnsupportedOperand {
        op: &'static str,
        operand: &'static str,
    },

    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    #[error("integer overflow in {0}")]
    IntegerOverflow(&'static str),

    #[error("value of type {0} is not callable")]
    NotCallable(&'static str),

    #[error("cannot iterate over {0}")]
    NotIterable(&'static str),

    #[error("range of {len} elements exceeds the limit of {limit}")]
    RangeTooLarge { len: i128, limit: usize },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("unhashable dict key of type {0}")]
    UnhashableKey(&'static str),

    #[error("invalid constant index {0}")]
    InvalidConstant(usize),

    #[error("invalid local slot {index} (frame has {count})")]
    InvalidLocal { index: usize, count: usize },

    #[error("{0} instruction has no name operand")]
    MissingName(&'static str),

    #[error("output error: {0}")]
    Output(String),
}

/// VM execution result
pub type VmResult<T> = Result<T, VmError>;

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        VmError::Output(err.to_string())
    }
}
