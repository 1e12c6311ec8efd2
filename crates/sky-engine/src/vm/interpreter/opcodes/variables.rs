use crate::compiler::bytecode::{Instruction, Opcode};
use crate::vm::interpreter::{Interpreter, OpcodeResult};
use crate::vm::stack::Stack;
use crate::vm::{VmError, VmResult};

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(in crate::vm::interpreter) fn exec_variable_ops(
        &mut self,
        stack: &mut Stack,
        ins: &Instruction,
        opcode: Opcode,
    ) -> OpcodeResult {
        match opcode {
            Opcode::GetLocal => stack
                .load_local(ins.operand)
                .map(|value| stack.push(value))
                .into(),

            Opcode::SetLocal => stack
                .pop()
                .and_then(|value| stack.store_local(ins.operand, value))
                .into(),

            Opcode::GetGlobal => self.get_global(stack, ins).into(),

            Opcode::SetGlobal => self.set_global(stack, ins).into(),

            _ => unreachable!("Not a variable opcode: {:?}", opcode),
        }
    }

    fn get_global(&mut self, stack: &mut Stack, ins: &Instruction) -> VmResult<()> {
        let name = ins.name.as_deref().ok_or(VmError::MissingName("GET_GLOBAL"))?;
        let value = self
            .globals
            .get(name)
            .cloned()
            .ok_or_else(|| VmError::UndefinedVariable(name.to_string()))?;
        stack.push(value);
        Ok(())
    }

    fn set_global(&mut self, stack: &mut Stack, ins: &Instruction) -> VmResult<()> {
        let name = ins.name.as_deref().ok_or(VmError::MissingName("SET_GLOBAL"))?;
        let value = stack.pop()?;
        self.globals.insert(name.to_string(), value);
        Ok(())
    }
}
