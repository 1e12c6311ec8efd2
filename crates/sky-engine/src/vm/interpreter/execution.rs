//! Opcode handler results

use crate::vm::{VmError, VmResult};

/// Result of executing a single opcode
///
/// Used internally by the interpreter to determine control flow.
#[derive(Debug)]
pub enum OpcodeResult {
    /// Continue with the instruction at the current ip
    Continue,

    /// Stop the run successfully
    Halt,

    /// An error occurred
    Error(VmError),
}

impl From<VmResult<()>> for OpcodeResult {
    fn from(result: VmResult<()>) -> Self {
        match result {
            Ok(()) => OpcodeResult::Continue,
            Err(e) => OpcodeResult::Error(e),
        }
    }
}
