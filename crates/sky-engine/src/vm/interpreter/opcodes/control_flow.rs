use crate::compiler::bytecode::{Instruction, Opcode};
use crate::vm::interpreter::{Interpreter, OpcodeResult};
use crate::vm::stack::Stack;

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(in crate::vm::interpreter) fn exec_control_flow_ops(
        &mut self,
        stack: &mut Stack,
        ip: &mut usize,
        ins: &Instruction,
        opcode: Opcode,
    ) -> OpcodeResult {
        match opcode {
            Opcode::Jump | Opcode::Loop => {
                *ip = ins.operand;
                OpcodeResult::Continue
            }

            Opcode::JumpIfFalse | Opcode::JumpIfTrue => {
                let condition = match stack.pop() {
                    Ok(v) => v.is_truthy(),
                    Err(e) => return OpcodeResult::Error(e),
                };
                if condition == (opcode == Opcode::JumpIfTrue) {
                    *ip = ins.operand;
                }
                OpcodeResult::Continue
            }

            Opcode::Halt => OpcodeResult::Halt,

            _ => unreachable!("Not a control flow opcode: {:?}", opcode),
        }
    }
}
