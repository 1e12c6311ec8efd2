//! Expression lowering
//!
//! Every expression leaves exactly one value on the stack.

use super::context::FunctionContext;
use super::stmt::unsupported;
use super::Compiler;
use crate::compiler::bytecode::{Constant, Instruction, Opcode};
use crate::compiler::error::{CompileError, CompileResult};
use crate::parser::ast::*;
use crate::parser::checker::is_builtin;

/// Where an identifier's value lives
enum Binding {
    Local(usize),
    Function,
    Global,
}

impl Compiler {
    pub(super) fn compile_expression(&mut self, expr: &Expression) -> CompileResult<()> {
        match expr {
            Expression::Identifier(ident) => self.compile_identifier(ident),
            Expression::Integer(lit) => {
                self.ctx.emit_constant(Constant::Integer(lit.value));
                Ok(())
            }
            Expression::Float(lit) => {
                self.ctx.emit_constant(Constant::Float(lit.value));
                Ok(())
            }
            Expression::String(lit) => {
                self.ctx.emit_constant(Constant::String(lit.value.clone()));
                Ok(())
            }
            Expression::Boolean(lit) => {
                self.ctx
                    .emit_op(if lit.value { Opcode::True } else { Opcode::False });
                Ok(())
            }
            Expression::List(list) => {
                for element in &list.elements {
                    self.compile_expression(element)?;
                }
                self.ctx.emit_with(Opcode::BuildList, list.elements.len());
                Ok(())
            }
            Expression::Dict(dict) => {
                for (key, value) in &dict.pairs {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.ctx.emit_with(Opcode::BuildDict, dict.pairs.len());
                Ok(())
            }
            Expression::Prefix(prefix) => {
                self.compile_expression(&prefix.right)?;
                match prefix.operator {
                    PrefixOperator::Not => {
                        self.ctx.emit_op(Opcode::Not);
                    }
                    PrefixOperator::Negate => {
                        self.ctx.emit_op(Opcode::Negate);
                    }
                    PrefixOperator::Plus => {}
                }
                Ok(())
            }
            Expression::Infix(infix) => self.compile_infix(infix),
            Expression::Call(call) => self.compile_call(call),
            Expression::Index(index) => {
                self.compile_expression(&index.left)?;
                self.compile_expression(&index.index)?;
                self.ctx.emit_op(Opcode::Index);
                Ok(())
            }
            Expression::Member(member) => unsupported("member access", &member.token),
            Expression::Await(await_expr) => {
                self.compile_expression(&await_expr.value)?;
                self.ctx.emit_op(Opcode::Await);
                Ok(())
            }
            Expression::Yield(yield_expr) => {
                match &yield_expr.value {
                    Some(value) => self.compile_expression(value)?,
                    None => {
                        self.ctx.emit_op(Opcode::Nil);
                    }
                }
                self.ctx.emit_op(Opcode::Yield);
                Ok(())
            }
            Expression::Match(match_expr) => self.compile_match(match_expr),
            Expression::EnumConstructor(ctor) => unsupported("enum constructors", &ctor.token),
            Expression::Lambda(lambda) => self.compile_lambda(lambda),
        }
    }

    fn resolve(&self, name: &str) -> Binding {
        if let Some(slot) = self.ctx.resolve(name) {
            Binding::Local(slot)
        } else if self.signatures.contains_key(name) {
            Binding::Function
        } else {
            Binding::Global
        }
    }

    fn compile_identifier(&mut self, ident: &Identifier) -> CompileResult<()> {
        match self.resolve(&ident.name) {
            Binding::Local(slot) => self.ctx.emit_get_local(slot, &ident.name),
            Binding::Function => {
                self.ctx
                    .emit_constant(Constant::Function(ident.name.clone()));
            }
            Binding::Global if ident.name == "nil" => {
                self.ctx.emit_op(Opcode::Nil);
            }
            Binding::Global => {
                self.ctx
                    .emit(Instruction::with_name(Opcode::GetGlobal, 0, ident.name.as_str()));
            }
        }
        Ok(())
    }

    fn compile_infix(&mut self, infix: &InfixExpression) -> CompileResult<()> {
        if infix.operator.is_assignment() {
            return self.compile_assignment(infix);
        }

        match infix.operator {
            // left; DUP; JUMP_IF_FALSE end; POP; right; end:
            InfixOperator::And | InfixOperator::Or => {
                self.compile_expression(&infix.left)?;
                self.ctx.emit_op(Opcode::Dup);
                let short = if infix.operator == InfixOperator::And {
                    Opcode::JumpIfFalse
                } else {
                    Opcode::JumpIfTrue
                };
                let end = self.ctx.emit_jump(short);
                self.ctx.emit_op(Opcode::Pop);
                self.compile_expression(&infix.right)?;
                self.ctx.patch_jump(end);
                Ok(())
            }
            op => {
                self.compile_expression(&infix.left)?;
                self.compile_expression(&infix.right)?;
                self.ctx.emit_op(binary_opcode(op)?);
                Ok(())
            }
        }
    }

    /// `x = v` compiles to `v; DUP; SET x` and `x op= v` to
    /// `GET x; v; OP; DUP; SET x`, leaving the stored value on the stack.
    fn compile_assignment(&mut self, infix: &InfixExpression) -> CompileResult<()> {
        let Some(target) = infix.left.as_identifier() else {
            return Err(CompileError::InvalidAssignmentTarget {
                target: infix.left.to_string(),
                position: infix.token.position(),
            });
        };

        if let Some(op) = infix.operator.compound_operator() {
            self.compile_identifier(target)?;
            self.compile_expression(&infix.right)?;
            self.ctx.emit_op(binary_opcode(op)?);
        } else {
            self.compile_expression(&infix.right)?;
        }
        self.ctx.emit_op(Opcode::Dup);

        match self.ctx.resolve(&target.name) {
            Some(slot) => self.ctx.emit_set_local(slot, &target.name),
            None => {
                self.ctx
                    .emit(Instruction::with_name(Opcode::SetGlobal, 0, target.name.as_str()));
            }
        }
        Ok(())
    }

    fn compile_call(&mut self, call: &CallExpression) -> CompileResult<()> {
        let Some(name) = call.callee_name() else {
            // Computed callee: the value must be a function at runtime.
            self.compile_expression(&call.function)?;
            return self.compile_plain_call(&call.arguments);
        };

        match self.resolve(name) {
            Binding::Local(slot) => {
                self.ctx.emit_get_local(slot, name);
                self.compile_plain_call(&call.arguments)
            }
            Binding::Function => self.compile_known_call(name, call),
            Binding::Global if is_builtin(name) => self.compile_builtin(name, call),
            Binding::Global if self.globals.contains(name) => {
                self.ctx
                    .emit(Instruction::with_name(Opcode::GetGlobal, 0, name));
                self.compile_plain_call(&call.arguments)
            }
            // Not declared anywhere; the VM reports it as an undefined function.
            Binding::Global => {
                self.ctx.emit_constant(Constant::Function(name.to_string()));
                self.compile_plain_call(&call.arguments)
            }
        }
    }

    /// Defaults run at the call site but see only globals and functions,
    /// never the caller's locals.
    fn compile_default(&mut self, default: &Expression) -> CompileResult<()> {
        let scopes = self.ctx.hide_scopes();
        let result = self.compile_expression(default);
        self.ctx.restore_scopes(scopes);
        result
    }

    fn compile_plain_call(&mut self, arguments: &[Expression]) -> CompileResult<()> {
        for arg in arguments {
            self.compile_expression(arg)?;
        }
        self.ctx.emit_with(Opcode::Call, arguments.len());
        Ok(())
    }

    /// Call to a declared function: omitted trailing arguments are filled
    /// from defaults and surplus arguments are packed for a variadic tail,
    /// so the argument count matches the declared arity.
    fn compile_known_call(&mut self, name: &str, call: &CallExpression) -> CompileResult<()> {
        let signature = match self.signatures.get(name) {
            Some(signature) => signature.clone(),
            None => return self.compile_plain_call(&call.arguments),
        };
        self.ctx.emit_constant(Constant::Function(name.to_string()));

        let args = &call.arguments;
        let fixed = if signature.variadic {
            signature.arity() - 1
        } else {
            signature.arity()
        };

        let mut pushed = 0;
        for arg in args.iter().take(fixed) {
            self.compile_expression(arg)?;
            pushed += 1;
        }
        while pushed < fixed {
            match &signature.defaults[pushed] {
                Some(default) => self.compile_default(default)?,
                // Missing required argument; the VM reports the arity error.
                None => break,
            }
            pushed += 1;
        }

        if pushed < fixed {
            for arg in args.iter().skip(pushed) {
                self.compile_expression(arg)?;
                pushed += 1;
            }
        } else if signature.variadic {
            let surplus = args.len().saturating_sub(fixed);
            for arg in args.iter().skip(fixed) {
                self.compile_expression(arg)?;
            }
            self.ctx.emit_with(Opcode::BuildList, surplus);
            pushed += 1;
        } else {
            for arg in args.iter().skip(fixed) {
                self.compile_expression(arg)?;
                pushed += 1;
            }
        }

        self.ctx.emit_with(Opcode::Call, pushed);
        Ok(())
    }

    fn compile_builtin(&mut self, name: &str, call: &CallExpression) -> CompileResult<()> {
        let argc = call.arguments.len();
        let (opcode, expected, valid): (Opcode, &'static str, bool) = match name {
            "print" => (Opcode::Print, "any number of", true),
            "len" => (Opcode::Len, "1", argc == 1),
            _ => (Opcode::Range, "1 or 2", argc == 1 || argc == 2),
        };
        if !valid {
            return Err(CompileError::BuiltinArity {
                name: builtin_name(opcode),
                expected,
                got: argc,
                position: call.token.position(),
            });
        }

        for arg in &call.arguments {
            self.compile_expression(arg)?;
        }
        match opcode {
            Opcode::Len => {
                self.ctx.emit_op(Opcode::Len);
            }
            op => {
                self.ctx.emit_with(op, argc);
            }
        }
        Ok(())
    }

    /// ```text
    ///     <subject>; SET_LOCAL s
    ///     GET_LOCAL s; <pattern>; EQUAL; JUMP_IF_FALSE next; <body>; JUMP end
    /// next:
    ///     ...
    ///     NIL
    /// end:
    /// ```
    fn compile_match(&mut self, expr: &MatchExpression) -> CompileResult<()> {
        self.compile_expression(&expr.subject)?;
        let subject = self.ctx.hidden_slot();
        self.ctx.emit_set_local(subject, "<match>");

        let mut end_jumps = Vec::new();
        let mut exhaustive = false;
        for arm in &expr.arms {
            if arm.is_wildcard() {
                self.compile_expression(&arm.body)?;
                end_jumps.push(self.ctx.emit_jump(Opcode::Jump));
                exhaustive = true;
                break;
            }
            self.ctx.emit_get_local(subject, "<match>");
            self.compile_expression(&arm.pattern)?;
            self.ctx.emit_op(Opcode::Equal);
            let next = self.ctx.emit_jump(Opcode::JumpIfFalse);
            self.compile_expression(&arm.body)?;
            end_jumps.push(self.ctx.emit_jump(Opcode::Jump));
            self.ctx.patch_jump(next);
        }

        if !exhaustive {
            self.ctx.emit_op(Opcode::Nil);
        }
        for jump in end_jumps {
            self.ctx.patch_jump(jump);
        }
        Ok(())
    }

    /// Lambdas become anonymous functions; they see globals but not the
    /// locals of the enclosing function.
    fn compile_lambda(&mut self, lambda: &LambdaExpression) -> CompileResult<()> {
        let name = self.next_lambda_name();
        let params = lambda.parameters.iter().map(|p| p.name.name.as_str());
        let outer = std::mem::replace(&mut self.ctx, FunctionContext::function(params));

        let result = self.compile_expression(&lambda.body);
        if result.is_ok() {
            self.ctx.emit_op(Opcode::Return);
        }
        let ctx = std::mem::replace(&mut self.ctx, outer);
        result?;

        self.finish_function(name.clone(), lambda.parameters.len(), false, ctx)?;
        self.ctx.emit_constant(Constant::Function(name));
        Ok(())
    }
}

fn binary_opcode(op: InfixOperator) -> CompileResult<Opcode> {
    let opcode = match op {
        InfixOperator::Add => Opcode::Add,
        InfixOperator::Subtract => Opcode::Sub,
        InfixOperator::Multiply => Opcode::Mul,
        InfixOperator::Divide => Opcode::Div,
        InfixOperator::Modulo => Opcode::Mod,
        InfixOperator::Power => Opcode::Pow,
        InfixOperator::Equal => Opcode::Equal,
        InfixOperator::NotEqual => Opcode::NotEqual,
        InfixOperator::LessThan => Opcode::Less,
        InfixOperator::LessEqual => Opcode::LessEq,
        InfixOperator::GreaterThan => Opcode::Greater,
        InfixOperator::GreaterEqual => Opcode::GreaterEq,
        other => {
            return Err(CompileError::InternalError {
                message: format!("no binary opcode for operator {}", other),
            })
        }
    };
    Ok(opcode)
}

fn builtin_name(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::Print => "print",
        Opcode::Len => "len",
        _ => "range",
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::bytecode::{Bytecode, Constant, Opcode};
    use crate::compiler::codegen::compile;
    use crate::compiler::error::CompileError;
    use crate::parser::Parser;

    fn compile_source(source: &str) -> Result<Bytecode, CompileError> {
        let (program, errors) = Parser::new(source, "test.sky").parse();
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        compile(&program)
    }

    fn opcodes(bytecode: &Bytecode) -> Vec<Opcode> {
        bytecode
            .instructions
            .iter()
            .filter_map(|ins| ins.opcode())
            .collect()
    }

    #[test]
    fn test_precedence_order() {
        let bytecode = compile_source("1 + 2 * 3\n").unwrap();
        assert_eq!(
            opcodes(&bytecode),
            vec![
                Opcode::Constant,
                Opcode::Constant,
                Opcode::Constant,
                Opcode::Mul,
                Opcode::Add,
                Opcode::Pop,
                Opcode::Halt
            ]
        );
    }

    #[test]
    fn test_compound_assignment_operand_order() {
        let bytecode = compile_source("let x = 10\nx -= 3\n").unwrap();
        assert_eq!(
            opcodes(&bytecode)[2..],
            [
                Opcode::GetGlobal,
                Opcode::Constant,
                Opcode::Sub,
                Opcode::Dup,
                Opcode::SetGlobal,
                Opcode::Pop,
                Opcode::Halt
            ]
        );
    }

    #[test]
    fn test_short_circuit_and() {
        let bytecode = compile_source("true && false\n").unwrap();
        assert_eq!(
            opcodes(&bytecode),
            vec![
                Opcode::True,
                Opcode::Dup,
                Opcode::JumpIfFalse,
                Opcode::Pop,
                Opcode::False,
                Opcode::Pop,
                Opcode::Halt
            ]
        );
        assert_eq!(bytecode.instructions[2].operand, 5);
    }

    #[test]
    fn test_builtins_use_dedicated_opcodes() {
        let bytecode = compile_source("print(len([1, 2]), range(3))\n").unwrap();
        let ops = opcodes(&bytecode);
        assert!(ops.contains(&Opcode::Len));
        assert!(ops.contains(&Opcode::Range));
        let print = bytecode
            .instructions
            .iter()
            .find(|i| i.is(Opcode::Print))
            .unwrap();
        assert_eq!(print.operand, 2);
        assert!(!ops.contains(&Opcode::Call));
    }

    #[test]
    fn test_user_call_pushes_callee_then_args() {
        let source = "function add(a, b)\n    return a + b\nend\nadd(2, 3)\n";
        let bytecode = compile_source(source).unwrap();
        assert_eq!(
            opcodes(&bytecode),
            vec![
                Opcode::Constant,
                Opcode::Constant,
                Opcode::Constant,
                Opcode::Call,
                Opcode::Pop,
                Opcode::Halt
            ]
        );
        assert_eq!(
            bytecode.constants.get(bytecode.instructions[0].operand),
            Some(&Constant::Function("add".into()))
        );
        let add = bytecode.function("add").unwrap();
        assert_eq!(add.arity, 2);
        assert_eq!(add.local_count, 2);
        assert_eq!(add.instructions[0].opcode(), Some(Opcode::GetLocal));
    }

    #[test]
    fn test_defaults_and_variadics_fill_arity() {
        let source = "function f(a, b = 10, ...rest)\n    return a\nend\nf(1)\nf(1, 2, 3, 4)\n";
        let bytecode = compile_source(source).unwrap();
        let calls: Vec<usize> = bytecode
            .instructions
            .iter()
            .filter(|i| i.is(Opcode::Call))
            .map(|i| i.operand)
            .collect();
        assert_eq!(calls, vec![3, 3]);

        let lists: Vec<usize> = bytecode
            .instructions
            .iter()
            .filter(|i| i.is(Opcode::BuildList))
            .map(|i| i.operand)
            .collect();
        assert_eq!(lists, vec![0, 2]);
    }

    #[test]
    fn test_lambda_is_registered() {
        let bytecode = compile_source("let double = function(x) x * 2 end\n").unwrap();
        let lambda = bytecode.function("<lambda#1>").unwrap();
        assert_eq!(lambda.arity, 1);
        assert_eq!(
            lambda.instructions.last().and_then(|i| i.opcode()),
            Some(Opcode::Return)
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = compile_source("let xs = [1]\nxs[0] = 2\n").unwrap_err();
        assert!(matches!(err, CompileError::InvalidAssignmentTarget { .. }));
    }

    #[test]
    fn test_match_without_wildcard_yields_nil() {
        let source = "let x = 2\nlet y = match x\n    1 => \"one\"\n    2 => \"two\"\nend\n";
        let bytecode = compile_source(source).unwrap();
        let ops = opcodes(&bytecode);
        assert_eq!(ops.iter().filter(|op| **op == Opcode::Equal).count(), 2);
        assert!(ops.contains(&Opcode::Nil));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let source = "function sq(n)\n    return n * n\nend\nfunction main()\n    print(sq(4))\nend\n";
        let first = compile_source(source).unwrap().disassemble("t");
        let second = compile_source(source).unwrap().disassemble("t");
        assert_eq!(first, second);
    }
}
