//! Sky bytecode compiler
//!
//! Lowers a checked AST to [`Bytecode`]: an entry instruction stream, a
//! constant pool, and a table of compiled functions.

pub mod bytecode;
pub mod codegen;
pub mod error;

pub use bytecode::{
    format_instruction, verify_bytecode, Bytecode, CompiledFunction, Constant, ConstantPool,
    Instruction, Opcode, VerifyError, FORMAT_VERSION,
};
pub use codegen::{compile, CompileOptions, Compiler, ENTRY_FUNCTION};
pub use error::{CompileError, CompileResult};
