//! Compiled program format
//!
//! A [`Bytecode`] value is the unit handed from the compiler to the VM: the
//! entry instruction stream with its constant pool, plus a table of
//! [`CompiledFunction`]s keyed by name. Each function owns its own
//! instructions (addressed from 0) and constants.
//!
//! Everything here is `serde`-serializable; `sky build` writes it as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::constants::ConstantPool;
use super::opcode::Opcode;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// A single VM instruction.
///
/// The opcode is kept as its raw byte so that bytecode read from disk can
/// carry values the VM does not know; those are reported at dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(rename = "op")]
    pub byte: u8,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub operand: usize,

    /// Variable or callee name, for globals and debugging output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            byte: opcode.to_u8(),
            operand: 0,
            name: None,
        }
    }

    pub fn with_operand(opcode: Opcode, operand: usize) -> Self {
        Self {
            byte: opcode.to_u8(),
            operand,
            name: None,
        }
    }

    pub fn with_name(opcode: Opcode, operand: usize, name: impl Into<String>) -> Self {
        Self {
            byte: opcode.to_u8(),
            operand,
            name: Some(name.into()),
        }
    }

    /// Decode the opcode byte.
    #[inline]
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.byte)
    }

    pub fn is(&self, opcode: Opcode) -> bool {
        self.byte == opcode.to_u8()
    }
}

/// A function compiled into its own address space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFunction {
    pub name: String,
    /// Number of parameters; a variadic parameter counts once
    pub arity: usize,
    /// Number of local slots, parameters included
    pub local_count: usize,
    #[serde(default)]
    pub is_async: bool,
    pub instructions: Vec<Instruction>,
    pub constants: ConstantPool,
}

/// A compiled program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bytecode {
    pub version: u32,
    /// Entry instruction stream (top-level code and the body of `main`)
    pub instructions: Vec<Instruction>,
    pub constants: ConstantPool,
    /// Local slots used by the entry stream
    pub local_count: usize,
    pub functions: BTreeMap<String, CompiledFunction>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            instructions: Vec::new(),
            constants: ConstantPool::new(),
            local_count: 0,
            functions: BTreeMap::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&CompiledFunction> {
        self.functions.get(name)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON. The result is not verified; see
    /// [`verify_bytecode`](super::verify_bytecode).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for Bytecode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::bytecode::Constant;

    #[test]
    fn test_instruction_decodes() {
        let ins = Instruction::with_operand(Opcode::JumpIfFalse, 7);
        assert_eq!(ins.opcode(), Some(Opcode::JumpIfFalse));
        assert!(ins.is(Opcode::JumpIfFalse));

        let bogus = Instruction {
            byte: 0xEE,
            operand: 0,
            name: None,
        };
        assert_eq!(bogus.opcode(), None);
    }

    #[test]
    fn test_json_shape() {
        let mut bytecode = Bytecode::new();
        let idx = bytecode.constants.add(Constant::Integer(5));
        bytecode
            .instructions
            .push(Instruction::with_operand(Opcode::Constant, idx));
        bytecode
            .instructions
            .push(Instruction::with_name(Opcode::SetGlobal, 0, "x"));
        bytecode.instructions.push(Instruction::new(Opcode::Halt));

        let json = bytecode.to_json().unwrap();
        assert!(json.contains("\"name\": \"x\""));
        assert!(json.contains("\"type\": \"integer\""));

        let back = Bytecode::from_json(&json).unwrap();
        assert_eq!(back, bytecode);
    }
}
