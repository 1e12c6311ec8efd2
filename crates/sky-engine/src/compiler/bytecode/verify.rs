//! Bytecode verification
//!
//! Structural checks run on bytecode loaded from disk before it reaches the
//! VM: opcodes are known, jump targets land inside the instruction stream,
//! constant and local indices are in range, and function references resolve.

use super::constants::{Constant, ConstantPool};
use super::module::{Bytecode, Instruction, FORMAT_VERSION};
use super::opcode::Opcode;

/// Bytecode verification errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerifyError {
    #[error("unsupported bytecode version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("{chunk}: invalid opcode {byte:#04x} at {offset}")]
    InvalidOpcode {
        chunk: String,
        byte: u8,
        offset: usize,
    },

    #[error("{chunk}: invalid jump target {target} at {offset}")]
    InvalidJumpTarget {
        chunk: String,
        target: usize,
        offset: usize,
    },

    #[error("{chunk}: invalid constant reference {index} at {offset}")]
    InvalidConstantRef {
        chunk: String,
        index: usize,
        offset: usize,
    },

    #[error("{chunk}: invalid local slot {index} (max {max}) at {offset}")]
    InvalidLocalRef {
        chunk: String,
        index: usize,
        max: usize,
        offset: usize,
    },

    #[error("{chunk}: {opcode} at {offset} has no name")]
    MissingName {
        chunk: String,
        opcode: Opcode,
        offset: usize,
    },

    #[error("{chunk}: reference to unknown function '{name}'")]
    UnknownFunction { chunk: String, name: String },

    #[error("function '{name}' declares {arity} parameters but only {local_count} locals")]
    ArityExceedsLocals {
        name: String,
        arity: usize,
        local_count: usize,
    },
}

/// Verify a whole program.
pub fn verify_bytecode(bytecode: &Bytecode) -> Result<(), VerifyError> {
    if bytecode.version != FORMAT_VERSION {
        return Err(VerifyError::UnsupportedVersion {
            found: bytecode.version,
            expected: FORMAT_VERSION,
        });
    }

    verify_chunk(
        "<main>",
        &bytecode.instructions,
        &bytecode.constants,
        bytecode.local_count,
        bytecode,
    )?;

    for function in bytecode.functions.values() {
        if function.arity > function.local_count {
            return Err(VerifyError::ArityExceedsLocals {
                name: function.name.clone(),
                arity: function.arity,
                local_count: function.local_count,
            });
        }
        verify_chunk(
            &function.name,
            &function.instructions,
            &function.constants,
            function.local_count,
            bytecode,
        )?;
    }

    Ok(())
}

fn verify_chunk(
    chunk: &str,
    instructions: &[Instruction],
    constants: &ConstantPool,
    local_count: usize,
    bytecode: &Bytecode,
) -> Result<(), VerifyError> {
    for (offset, ins) in instructions.iter().enumerate() {
        let opcode = ins.opcode().ok_or_else(|| VerifyError::InvalidOpcode {
            chunk: chunk.to_string(),
            byte: ins.byte,
            offset,
        })?;

        // A jump may target one past the end: falling off the stream halts.
        if opcode.is_jump() && ins.operand > instructions.len() {
            return Err(VerifyError::InvalidJumpTarget {
                chunk: chunk.to_string(),
                target: ins.operand,
                offset,
            });
        }

        match opcode {
            Opcode::Constant => match constants.get(ins.operand) {
                None => {
                    return Err(VerifyError::InvalidConstantRef {
                        chunk: chunk.to_string(),
                        index: ins.operand,
                        offset,
                    })
                }
                Some(Constant::Function(name)) if !bytecode.functions.contains_key(name) => {
                    return Err(VerifyError::UnknownFunction {
                        chunk: chunk.to_string(),
                        name: name.clone(),
                    })
                }
                Some(_) => {}
            },
            Opcode::GetLocal | Opcode::SetLocal if ins.operand >= local_count => {
                return Err(VerifyError::InvalidLocalRef {
                    chunk: chunk.to_string(),
                    index: ins.operand,
                    max: local_count,
                    offset,
                });
            }
            op if op.has_name() && ins.name.is_none() => {
                return Err(VerifyError::MissingName {
                    chunk: chunk.to_string(),
                    opcode: op,
                    offset,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::bytecode::CompiledFunction;

    fn program(instructions: Vec<Instruction>) -> Bytecode {
        let mut bytecode = Bytecode::new();
        bytecode.instructions = instructions;
        bytecode
    }

    #[test]
    fn test_valid_program() {
        let mut bytecode = program(vec![
            Instruction::with_operand(Opcode::Constant, 0),
            Instruction::with_name(Opcode::SetGlobal, 0, "x"),
            Instruction::new(Opcode::Halt),
        ]);
        bytecode.constants.add(Constant::Integer(1));
        assert_eq!(verify_bytecode(&bytecode), Ok(()));
    }

    #[test]
    fn test_invalid_opcode() {
        let bytecode = program(vec![Instruction {
            byte: 0xEE,
            operand: 0,
            name: None,
        }]);
        assert!(matches!(
            verify_bytecode(&bytecode),
            Err(VerifyError::InvalidOpcode { byte: 0xEE, .. })
        ));
    }

    #[test]
    fn test_jump_out_of_range() {
        let bytecode = program(vec![Instruction::with_operand(Opcode::Jump, 10)]);
        assert!(matches!(
            verify_bytecode(&bytecode),
            Err(VerifyError::InvalidJumpTarget { target: 10, .. })
        ));
    }

    #[test]
    fn test_local_out_of_range() {
        let mut bytecode = Bytecode::new();
        bytecode.functions.insert(
            "f".to_string(),
            CompiledFunction {
                name: "f".to_string(),
                arity: 1,
                local_count: 1,
                is_async: false,
                instructions: vec![Instruction::with_operand(Opcode::GetLocal, 3)],
                constants: ConstantPool::new(),
            },
        );
        let err = verify_bytecode(&bytecode).unwrap_err();
        assert_eq!(err.to_string(), "f: invalid local slot 3 (max 1) at 0");
    }

    #[test]
    fn test_unknown_function_constant() {
        let mut bytecode = program(vec![Instruction::with_operand(Opcode::Constant, 0)]);
        bytecode.constants.add(Constant::Function("ghost".into()));
        assert!(matches!(
            verify_bytecode(&bytecode),
            Err(VerifyError::UnknownFunction { .. })
        ));
    }
}
