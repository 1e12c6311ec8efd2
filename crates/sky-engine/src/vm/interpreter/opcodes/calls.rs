use crate::compiler::bytecode::{Instruction, Opcode};
use crate::vm::interpreter::{Interpreter, OpcodeResult};
use crate::vm::stack::Stack;
use crate::vm::value::Value;
use crate::vm::{VmError, VmResult};

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(in crate::vm::interpreter) fn exec_call_ops(
        &mut self,
        stack: &mut Stack,
        ip: &mut usize,
        ins: &Instruction,
        opcode: Opcode,
    ) -> OpcodeResult {
        match opcode {
            Opcode::Call => self.call(stack, ip, ins.operand).into(),

            Opcode::Return => self.return_from_call(stack, ip),

            // No suspension: the operand passes through unchanged.
            Opcode::Await | Opcode::Yield => match stack.peek() {
                Ok(_) => OpcodeResult::Continue,
                Err(e) => OpcodeResult::Error(e),
            },

            _ => unreachable!("Not a call opcode: {:?}", opcode),
        }
    }

    /// `CALL argc` with the callee below its arguments. The arguments stay
    /// where they are and become the callee's first locals.
    fn call(&mut self, stack: &mut Stack, ip: &mut usize, argc: usize) -> VmResult<()> {
        let name = match stack.peek_n(argc)? {
            Value::Function(name) => name.clone(),
            other => return Err(VmError::NotCallable(other.type_name())),
        };
        let index = *self
            .function_index
            .get(&*name)
            .ok_or_else(|| VmError::UndefinedFunction(name.to_string()))?;
        let chunk = self
            .chunks
            .get(index)
            .ok_or_else(|| VmError::UndefinedFunction(name.to_string()))?;

        if argc != chunk.arity {
            return Err(VmError::ArityMismatch {
                name: name.to_string(),
                expected: chunk.arity,
                got: argc,
            });
        }

        let base = stack.depth() - argc;
        let local_count = chunk.local_count.max(chunk.arity);
        stack.push_frame(index, *ip, base, local_count)?;
        *ip = 0;
        Ok(())
    }

    /// Pop the result and the current frame, drop the callee and its
    /// locals, and push the result for the caller. Returning from the main
    /// frame ends the run.
    pub(in crate::vm::interpreter) fn return_from_call(
        &mut self,
        stack: &mut Stack,
        ip: &mut usize,
    ) -> OpcodeResult {
        let result = match stack.pop() {
            Ok(v) => v,
            Err(e) => return OpcodeResult::Error(e),
        };
        let frame = match stack.pop_frame() {
            Ok(frame) => frame,
            Err(e) => return OpcodeResult::Error(e),
        };
        if stack.frame_count() == 0 {
            return OpcodeResult::Halt;
        }

        stack.truncate(frame.base.saturating_sub(1));
        stack.push(result);
        *ip = frame.return_ip;
        OpcodeResult::Continue
    }
}
