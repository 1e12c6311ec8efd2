//! Human-readable bytecode listings
//!
//! ```text
//! == demo.sky ==
//! 0000 CONSTANT         0 (5)
//! 0001 SET_GLOBAL       x
//! 0002 HALT
//!
//! -- function add (arity 2, locals 2) --
//! 0000 GET_LOCAL        0 a
//! ```

use std::fmt::Write;

use super::constants::ConstantPool;
use super::module::{Bytecode, Instruction};
use super::opcode::Opcode;

impl Bytecode {
    /// Render every instruction of the entry stream and of each function.
    /// Functions are listed in name order, so the output is deterministic.
    pub fn disassemble(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", name);
        write_chunk(&mut out, &self.instructions, &self.constants);

        for function in self.functions.values() {
            let _ = writeln!(
                out,
                "\n-- function {} (arity {}, locals {}{}) --",
                function.name,
                function.arity,
                function.local_count,
                if function.is_async { ", async" } else { "" }
            );
            write_chunk(&mut out, &function.instructions, &function.constants);
        }
        out
    }
}

fn write_chunk(out: &mut String, instructions: &[Instruction], constants: &ConstantPool) {
    for (index, ins) in instructions.iter().enumerate() {
        let _ = writeln!(out, "{}", format_instruction(index, ins, constants));
    }
}

/// Format one instruction as `<index> <OPCODE> <operands>`.
pub fn format_instruction(index: usize, ins: &Instruction, constants: &ConstantPool) -> String {
    let Some(opcode) = ins.opcode() else {
        return format!("{:04} UNKNOWN({:#04x})", index, ins.byte);
    };

    let mut line = format!("{:04} {}", index, opcode.name());
    if opcode.has_name() {
        let name = ins.name.as_deref().unwrap_or("?");
        let _ = write!(line, "{:pad$}{}", "", name, pad = 17 - opcode.name().len());
    } else if opcode.has_operand() {
        let _ = write!(line, "{:pad$}{}", "", ins.operand, pad = 17 - opcode.name().len());
        match (opcode, constants.get(ins.operand), &ins.name) {
            (Opcode::Constant, Some(constant), _) => {
                let _ = write!(line, " ({})", constant);
            }
            (_, _, Some(name)) => {
                let _ = write!(line, " {}", name);
            }
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::bytecode::{CompiledFunction, Constant};

    #[test]
    fn test_listing() {
        let mut bytecode = Bytecode::new();
        let five = bytecode.constants.add(Constant::Integer(5));
        bytecode.instructions = vec![
            Instruction::with_operand(Opcode::Constant, five),
            Instruction::with_name(Opcode::SetGlobal, 0, "x"),
            Instruction::new(Opcode::Halt),
        ];
        bytecode.functions.insert(
            "id".into(),
            CompiledFunction {
                name: "id".into(),
                arity: 1,
                local_count: 1,
                is_async: false,
                instructions: vec![
                    Instruction::with_name(Opcode::GetLocal, 0, "a"),
                    Instruction::new(Opcode::Return),
                ],
                constants: ConstantPool::new(),
            },
        );

        let text = bytecode.disassemble("demo.sky");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== demo.sky ==");
        assert_eq!(lines[1], "0000 CONSTANT         0 (5)");
        assert_eq!(lines[2], "0001 SET_GLOBAL       x");
        assert_eq!(lines[3], "0002 HALT");
        assert_eq!(lines[5], "-- function id (arity 1, locals 1) --");
        assert_eq!(lines[6], "0000 GET_LOCAL        0 a");
        assert_eq!(lines[7], "0001 RETURN");
    }

    #[test]
    fn test_unknown_opcode_listed() {
        let ins = Instruction {
            byte: 0xEE,
            operand: 0,
            name: None,
        };
        assert_eq!(
            format_instruction(3, &ins, &ConstantPool::new()),
            "0003 UNKNOWN(0xee)"
        );
    }
}
