//! Sky VM Bytecode Definitions
//!
//! This module provides the instruction set, the compiled program format,
//! constant pools, verification for bytecode loaded from disk, and the
//! disassembler.

pub mod constants;
pub mod disassemble;
pub mod module;
pub mod opcode;
pub mod verify;

pub use constants::{Constant, ConstantPool};
pub use disassemble::format_instruction;
pub use module::{Bytecode, CompiledFunction, Instruction, FORMAT_VERSION};
pub use opcode::Opcode;
pub use verify::{verify_bytecode, VerifyError};
