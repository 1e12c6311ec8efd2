//! Fetch-decode-execute loop

use std::io::Write;

use super::{Interpreter, OpcodeResult};
use crate::compiler::bytecode::{format_instruction, ConstantPool, Instruction, Opcode};
use crate::vm::stack::Stack;
use crate::vm::value::Value;
use crate::vm::{VmError, VmResult};

impl<'a, 'b> Interpreter<'a, 'b> {
    /// Run the entry chunk until `HALT`, a `RETURN` from the main frame, or
    /// the end of the entry stream.
    pub(in crate::vm::interpreter) fn execute(&mut self, stack: &mut Stack) -> VmResult<()> {
        let entry_locals = self.chunks.first().map_or(0, |chunk| chunk.local_count);
        stack.push_frame(0, 0, 0, entry_locals)?;
        let mut ip = 0;

        loop {
            let chunk_index = stack
                .current_frame()
                .map(|frame| frame.chunk)
                .ok_or(VmError::StackUnderflow)?;
            let Some(chunk) = self.chunks.get(chunk_index) else {
                return Err(VmError::StackUnderflow);
            };
            let instructions: &'b [Instruction] = chunk.instructions;
            let constants: &'b ConstantPool = chunk.constants;

            let Some(ins) = instructions.get(ip) else {
                // Running off the end: the entry stream finishes, a function
                // returns nil.
                if stack.frame_count() <= 1 {
                    return Ok(());
                }
                stack.push(Value::Nil);
                match self.return_from_call(stack, &mut ip) {
                    OpcodeResult::Continue => continue,
                    OpcodeResult::Halt => return Ok(()),
                    OpcodeResult::Error(e) => return Err(e),
                }
            };

            if let Some(trace) = self.trace.as_mut() {
                writeln!(
                    trace,
                    "[{}] {} | stack={}",
                    stack.frame_count(),
                    format_instruction(ip, ins, constants),
                    stack.depth()
                )?;
            }

            let opcode = Opcode::from_u8(ins.byte).ok_or(VmError::UnknownOpcode(ins.byte))?;
            ip += 1;

            match self.execute_opcode(stack, &mut ip, ins, constants, opcode) {
                OpcodeResult::Continue => {}
                OpcodeResult::Halt => return Ok(()),
                OpcodeResult::Error(e) => return Err(e),
            }
        }
    }

    /// Execute a single opcode
    fn execute_opcode(
        &mut self,
        stack: &mut Stack,
        ip: &mut usize,
        ins: &Instruction,
        constants: &ConstantPool,
        opcode: Opcode,
    ) -> OpcodeResult {
        match opcode {
            // =========================================================
            // Stack Manipulation & Constants
            // =========================================================
            Opcode::Constant
            | Opcode::Pop
            | Opcode::Dup
            | Opcode::True
            | Opcode::False
            | Opcode::Nil => self.exec_stack_ops(stack, ins, constants, opcode),

            // =========================================================
            // Variables
            // =========================================================
            Opcode::GetLocal | Opcode::SetLocal | Opcode::GetGlobal | Opcode::SetGlobal => {
                self.exec_variable_ops(stack, ins, opcode)
            }

            // =========================================================
            // Arithmetic
            // =========================================================
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Pow
            | Opcode::Negate => self.exec_arithmetic_ops(stack, opcode),

            // =========================================================
            // Comparisons and Logical Operators
            // =========================================================
            Opcode::Equal
            | Opcode::NotEqual
            | Opcode::Greater
            | Opcode::GreaterEq
            | Opcode::Less
            | Opcode::LessEq
            | Opcode::Not => self.exec_comparison_ops(stack, opcode),

            // =========================================================
            // Control Flow
            // =========================================================
            Opcode::Jump
            | Opcode::JumpIfFalse
            | Opcode::JumpIfTrue
            | Opcode::Loop
            | Opcode::Halt => self.exec_control_flow_ops(stack, ip, ins, opcode),

            // =========================================================
            // Calls
            // =========================================================
            Opcode::Call | Opcode::Return | Opcode::Await | Opcode::Yield => {
                self.exec_call_ops(stack, ip, ins, opcode)
            }

            // =========================================================
            // Builtins & Collections
            // =========================================================
            Opcode::Print
            | Opcode::Len
            | Opcode::Range
            | Opcode::BuildList
            | Opcode::BuildDict
            | Opcode::Index
            | Opcode::GetIter => self.exec_builtin_ops(stack, ins, opcode),
        }
    }
}
