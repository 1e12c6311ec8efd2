use crate::compiler::bytecode::{ConstantPool, Instruction, Opcode};
use crate::vm::interpreter::{Interpreter, OpcodeResult};
use crate::vm::stack::Stack;
use crate::vm::value::Value;
use crate::vm::VmError;

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(in crate::vm::interpreter) fn exec_stack_ops(
        &mut self,
        stack: &mut Stack,
        ins: &Instruction,
        constants: &ConstantPool,
        opcode: Opcode,
    ) -> OpcodeResult {
        match opcode {
            Opcode::Constant => match constants.get(ins.operand) {
                Some(constant) => {
                    stack.push(Value::from(constant));
                    OpcodeResult::Continue
                }
                None => OpcodeResult::Error(VmError::InvalidConstant(ins.operand)),
            },

            Opcode::Pop => match stack.pop() {
                Ok(value) => {
                    *self.last_popped = value;
                    OpcodeResult::Continue
                }
                Err(e) => OpcodeResult::Error(e),
            },

            Opcode::Dup => match stack.peek() {
                Ok(value) => {
                    let value = value.clone();
                    stack.push(value);
                    OpcodeResult::Continue
                }
                Err(e) => OpcodeResult::Error(e),
            },

            Opcode::True => {
                stack.push(Value::Bool(true));
                OpcodeResult::Continue
            }

            Opcode::False => {
                stack.push(Value::Bool(false));
                OpcodeResult::Continue
            }

            Opcode::Nil => {
                stack.push(Value::Nil);
                OpcodeResult::Continue
            }

            _ => unreachable!("Not a stack opcode: {:?}", opcode),
        }
    }
}
