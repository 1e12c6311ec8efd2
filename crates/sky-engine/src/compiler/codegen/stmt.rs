//! Statement lowering

use super::context::LoopContext;
use super::Compiler;
use crate::compiler::bytecode::{Constant, Instruction, Opcode};
use crate::compiler::error::{CompileError, CompileResult};
use crate::parser::ast::*;
use crate::parser::token::Token;

impl Compiler {
    pub(super) fn compile_statement(&mut self, stmt: &Statement) -> CompileResult<()> {
        match stmt {
            Statement::Let(s) => self.compile_binding(&s.name, s.value.as_ref()),
            Statement::Const(s) => self.compile_binding(&s.name, Some(&s.value)),
            Statement::Return(s) => {
                match &s.value {
                    Some(value) => self.compile_expression(value)?,
                    None => {
                        self.ctx.emit_op(Opcode::Nil);
                    }
                }
                self.ctx.emit_op(Opcode::Return);
                Ok(())
            }
            Statement::Break(s) => self.compile_break(&s.token),
            Statement::Continue(s) => self.compile_continue(&s.token),
            Statement::Expression(s) => {
                self.compile_expression(&s.expression)?;
                self.ctx.emit_op(Opcode::Pop);
                Ok(())
            }
            Statement::Function(func) => self.compile_function(func),
            Statement::If(s) => self.compile_if(s),
            Statement::While(s) => self.compile_while(s),
            Statement::For(s) => self.compile_for(s),
            Statement::Unsafe(s) => self.compile_block(&s.body),
            Statement::Block(block) => self.compile_block(block),
            Statement::Class(s) => unsupported("class declarations", &s.token),
            Statement::Import(s) => unsupported("import", &s.token),
            Statement::Enum(s) => unsupported("enum declarations", &s.token),
            Statement::Try(s) => unsupported("try/catch", &s.token),
            Statement::Throw(s) => unsupported("throw", &s.token),
        }
    }

    /// `let`/`const`: a global at the top level, a fresh slot elsewhere.
    fn compile_binding(&mut self, name: &Identifier, value: Option<&Expression>) -> CompileResult<()> {
        match value {
            Some(value) => self.compile_expression(value)?,
            None => {
                self.ctx.emit_op(Opcode::Nil);
            }
        }

        if self.ctx.is_global_scope() {
            self.ctx
                .emit(Instruction::with_name(Opcode::SetGlobal, 0, name.name.as_str()));
        } else {
            // Defined after the initializer so `let x = x` reads the outer x.
            let slot = self.ctx.define(&name.name);
            self.ctx.emit_set_local(slot, &name.name);
        }
        Ok(())
    }

    /// Statements of a block in a child scope.
    fn compile_block(&mut self, block: &BlockStatement) -> CompileResult<()> {
        self.ctx.enter_scope();
        let result = block
            .statements
            .iter()
            .try_for_each(|stmt| self.compile_statement(stmt));
        self.ctx.leave_scope();
        result
    }

    fn compile_if(&mut self, stmt: &IfStatement) -> CompileResult<()> {
        let mut end_jumps = Vec::new();

        self.compile_expression(&stmt.condition)?;
        let mut next = self.ctx.emit_jump(Opcode::JumpIfFalse);
        self.compile_block(&stmt.consequence)?;

        for elif in &stmt.elifs {
            end_jumps.push(self.ctx.emit_jump(Opcode::Jump));
            self.ctx.patch_jump(next);

            self.compile_expression(&elif.condition)?;
            next = self.ctx.emit_jump(Opcode::JumpIfFalse);
            self.compile_block(&elif.consequence)?;
        }

        if let Some(alternative) = &stmt.alternative {
            end_jumps.push(self.ctx.emit_jump(Opcode::Jump));
            self.ctx.patch_jump(next);
            self.compile_block(alternative)?;
        } else {
            self.ctx.patch_jump(next);
        }

        for jump in end_jumps {
            self.ctx.patch_jump(jump);
        }
        Ok(())
    }

    fn compile_while(&mut self, stmt: &WhileStatement) -> CompileResult<()> {
        let loop_start = self.ctx.position();
        self.compile_expression(&stmt.condition)?;
        let exit = self.ctx.emit_jump(Opcode::JumpIfFalse);

        self.ctx.loops.push(LoopContext {
            continue_target: Some(loop_start),
            ..LoopContext::default()
        });
        let body = self.compile_block(&stmt.body);
        let loop_ctx = self.ctx.loops.pop().unwrap_or_default();
        body?;

        self.ctx.emit_loop(loop_start);
        self.ctx.patch_jump(exit);
        for jump in loop_ctx.break_jumps {
            self.ctx.patch_jump(jump);
        }
        Ok(())
    }

    /// `for x in e` walks a snapshot of `e` by index:
    ///
    /// ```text
    ///     <e>; GET_ITER; SET_LOCAL items
    ///     CONSTANT 0; SET_LOCAL index
    /// top:
    ///     GET_LOCAL index; GET_LOCAL items; LEN; LESS; JUMP_IF_FALSE exit
    ///     GET_LOCAL items; GET_LOCAL index; INDEX; SET_LOCAL x
    ///     <body>
    /// step:
    ///     GET_LOCAL index; CONSTANT 1; ADD; SET_LOCAL index
    ///     LOOP top
    /// exit:
    /// ```
    fn compile_for(&mut self, stmt: &ForStatement) -> CompileResult<()> {
        self.compile_expression(&stmt.iterable)?;
        self.ctx.emit_op(Opcode::GetIter);
        let items = self.ctx.hidden_slot();
        self.ctx.emit_set_local(items, "<items>");

        self.ctx.emit_constant(Constant::Integer(0));
        let index = self.ctx.hidden_slot();
        self.ctx.emit_set_local(index, "<index>");

        let loop_start = self.ctx.position();
        self.ctx.emit_get_local(index, "<index>");
        self.ctx.emit_get_local(items, "<items>");
        self.ctx.emit_op(Opcode::Len);
        self.ctx.emit_op(Opcode::Less);
        let exit = self.ctx.emit_jump(Opcode::JumpIfFalse);

        self.ctx.enter_scope();
        self.ctx.emit_get_local(items, "<items>");
        self.ctx.emit_get_local(index, "<index>");
        self.ctx.emit_op(Opcode::Index);
        let var = self.ctx.define(&stmt.iterator.name);
        self.ctx.emit_set_local(var, &stmt.iterator.name);

        self.ctx.loops.push(LoopContext::default());
        let body = self.compile_block(&stmt.body);
        let loop_ctx = self.ctx.loops.pop().unwrap_or_default();
        self.ctx.leave_scope();
        body?;

        for jump in loop_ctx.continue_jumps {
            self.ctx.patch_jump(jump);
        }
        self.ctx.emit_get_local(index, "<index>");
        self.ctx.emit_constant(Constant::Integer(1));
        self.ctx.emit_op(Opcode::Add);
        self.ctx.emit_set_local(index, "<index>");
        self.ctx.emit_loop(loop_start);

        self.ctx.patch_jump(exit);
        for jump in loop_ctx.break_jumps {
            self.ctx.patch_jump(jump);
        }
        Ok(())
    }

    fn compile_break(&mut self, token: &Token) -> CompileResult<()> {
        if self.ctx.loops.is_empty() {
            return Err(CompileError::InvalidLoopControl {
                keyword: "break",
                position: token.position(),
            });
        }
        let jump = self.ctx.emit_jump(Opcode::Jump);
        if let Some(loop_ctx) = self.ctx.loops.last_mut() {
            loop_ctx.break_jumps.push(jump);
        }
        Ok(())
    }

    fn compile_continue(&mut self, token: &Token) -> CompileResult<()> {
        let target = match self.ctx.loops.last() {
            Some(loop_ctx) => loop_ctx.continue_target,
            None => {
                return Err(CompileError::InvalidLoopControl {
                    keyword: "continue",
                    position: token.position(),
                })
            }
        };

        match target {
            Some(start) => self.ctx.emit_loop(start),
            None => {
                let jump = self.ctx.emit_jump(Opcode::Jump);
                if let Some(loop_ctx) = self.ctx.loops.last_mut() {
                    loop_ctx.continue_jumps.push(jump);
                }
            }
        }
        Ok(())
    }
}

pub(super) fn unsupported<T>(feature: &str, token: &Token) -> CompileResult<T> {
    Err(CompileError::Unsupported {
        feature: feature.to_string(),
        position: token.position(),
    })
}

#[cfg(test)]
mod tests {
    use crate::compiler::bytecode::{Bytecode, Opcode};
    use crate::compiler::codegen::compile;
    use crate::compiler::error::CompileError;
    use crate::parser::Parser;

    fn compile_source(source: &str) -> Result<Bytecode, CompileError> {
        let (program, errors) = Parser::new(source, "test.sky").parse();
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        compile(&program)
    }

    fn opcodes(code: &[crate::compiler::bytecode::Instruction]) -> Vec<Opcode> {
        code.iter().filter_map(|ins| ins.opcode()).collect()
    }

    #[test]
    fn test_top_level_let_is_global() {
        let bytecode = compile_source("let x = 5\n").unwrap();
        assert_eq!(
            opcodes(&bytecode.instructions),
            vec![Opcode::Constant, Opcode::SetGlobal, Opcode::Halt]
        );
        assert_eq!(bytecode.instructions[1].name.as_deref(), Some("x"));
    }

    #[test]
    fn test_main_body_is_local_and_inlined_last() {
        let source = "function main()\n    let y = 1\nend\nlet x = 2\n";
        let bytecode = compile_source(source).unwrap();
        assert!(bytecode.functions.is_empty());
        assert_eq!(
            opcodes(&bytecode.instructions),
            vec![
                Opcode::Constant,
                Opcode::SetGlobal,
                Opcode::Constant,
                Opcode::SetLocal,
                Opcode::Halt
            ]
        );
        assert_eq!(bytecode.local_count, 1);
    }

    #[test]
    fn test_if_else_jumps_are_patched() {
        let source = "let x = 1\nif x > 0\n    print(1)\nelse\n    print(2)\nend\n";
        let bytecode = compile_source(source).unwrap();
        let code = &bytecode.instructions;
        let jif = code.iter().position(|i| i.is(Opcode::JumpIfFalse)).unwrap();
        let jmp = code.iter().position(|i| i.is(Opcode::Jump)).unwrap();
        // The false branch starts right after the unconditional jump
        assert_eq!(code[jif].operand, jmp + 1);
        assert!(code[jmp].operand <= code.len());
    }

    #[test]
    fn test_while_loops_back_to_condition() {
        let source = "let i = 0\nwhile i < 3\n    i += 1\nend\n";
        let bytecode = compile_source(source).unwrap();
        let code = &bytecode.instructions;
        let lp = code.iter().position(|i| i.is(Opcode::Loop)).unwrap();
        assert_eq!(code[lp].operand, 2);
        let exit = code.iter().position(|i| i.is(Opcode::JumpIfFalse)).unwrap();
        assert_eq!(code[exit].operand, lp + 1);
    }

    #[test]
    fn test_break_outside_loop_rejected() {
        let err = compile_source("break\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidLoopControl { keyword: "break", .. }));
    }

    #[test]
    fn test_class_is_unsupported() {
        let err = compile_source("class A\n    let x = 1\nend\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "test.sky:1:1: class declarations is not supported by the bytecode compiler"
        );
    }
}
