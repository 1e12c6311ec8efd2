//! AST to bytecode lowering
//!
//! The compiler walks a checked [`Program`] once. Top-level `let`/`const`
//! become globals; every function other than `main` is compiled into its own
//! [`CompiledFunction`] and the body of `main` is appended to the entry
//! stream after the remaining top-level statements.

mod context;
mod expr;
mod stmt;

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::compiler::bytecode::{Bytecode, CompiledFunction, Opcode};
use crate::compiler::error::{CompileError, CompileResult};
use crate::parser::ast::{Expression, FunctionStatement, Program, Statement};

use context::FunctionContext;

/// Name of the function whose body is the program entry point
pub const ENTRY_FUNCTION: &str = "main";

/// Settings for a compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    /// Run [`verify_bytecode`](crate::compiler::bytecode::verify_bytecode)
    /// on the result
    pub verify: bool,
}

/// Call-site information for a named function
#[derive(Debug, Clone)]
struct FunctionSignature {
    /// Default value per parameter, `None` if required
    defaults: Vec<Option<Expression>>,
    variadic: bool,
}

impl FunctionSignature {
    fn of(func: &FunctionStatement) -> Self {
        Self {
            defaults: func.parameters.iter().map(|p| p.default.clone()).collect(),
            variadic: func.is_variadic(),
        }
    }

    fn arity(&self) -> usize {
        self.defaults.len()
    }
}

/// Bytecode compiler
pub struct Compiler {
    options: CompileOptions,
    /// Context of the function being compiled
    ctx: FunctionContext,
    functions: BTreeMap<String, CompiledFunction>,
    signatures: FxHashMap<String, FunctionSignature>,
    /// Names declared by top-level `let`/`const`
    globals: FxHashSet<String>,
    lambda_count: usize,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_options(CompileOptions::default())
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self {
            options,
            ctx: FunctionContext::main(),
            functions: BTreeMap::new(),
            signatures: FxHashMap::default(),
            globals: FxHashSet::default(),
            lambda_count: 0,
        }
    }

    /// Compile a whole program.
    pub fn compile(mut self, program: &Program) -> CompileResult<Bytecode> {
        self.declare_top_level(program);

        let mut entry = None;
        for stmt in &program.statements {
            match stmt {
                Statement::Function(func) if func.name.name == ENTRY_FUNCTION => entry = Some(func),
                _ => self.compile_statement(stmt)?,
            }
        }

        if let Some(main) = entry {
            self.ctx.enter_scope();
            for stmt in &main.body.statements {
                self.compile_statement(stmt)?;
            }
            self.ctx.leave_scope();
        }
        self.ctx.emit_op(Opcode::Halt);

        if self.ctx.has_unpatched_jumps() {
            return Err(CompileError::InternalError {
                message: "unpatched jump in entry stream".to_string(),
            });
        }

        let bytecode = Bytecode {
            local_count: self.ctx.local_count(),
            instructions: std::mem::take(&mut self.ctx.instructions),
            constants: std::mem::take(&mut self.ctx.constants),
            functions: self.functions,
            ..Bytecode::new()
        };

        if self.options.verify {
            crate::compiler::bytecode::verify_bytecode(&bytecode).map_err(|e| {
                CompileError::Verification {
                    message: e.to_string(),
                }
            })?;
        }
        Ok(bytecode)
    }

    /// Record every top-level function signature and global name so that
    /// calls and references may precede declarations.
    fn declare_top_level(&mut self, program: &Program) {
        for stmt in &program.statements {
            match stmt {
                Statement::Function(func) if func.name.name != ENTRY_FUNCTION => {
                    self.signatures
                        .insert(func.name.name.clone(), FunctionSignature::of(func));
                }
                Statement::Let(s) => {
                    self.globals.insert(s.name.name.clone());
                }
                Statement::Const(s) => {
                    self.globals.insert(s.name.name.clone());
                }
                _ => {}
            }
        }
    }

    /// Compile a function body into its own chunk and register it.
    fn compile_function(&mut self, func: &FunctionStatement) -> CompileResult<()> {
        let name = func.name.name.clone();
        self.signatures
            .entry(name.clone())
            .or_insert_with(|| FunctionSignature::of(func));

        let params = func.parameters.iter().map(|p| p.name.name.as_str());
        let outer = std::mem::replace(&mut self.ctx, FunctionContext::function(params));

        let result = func
            .body
            .statements
            .iter()
            .try_for_each(|stmt| self.compile_statement(stmt));
        let ctx = std::mem::replace(&mut self.ctx, outer);
        result?;

        self.finish_function(name, func.arity(), func.is_async, ctx)
    }

    /// Append the implicit `return nil` and store the chunk.
    fn finish_function(
        &mut self,
        name: String,
        arity: usize,
        is_async: bool,
        mut ctx: FunctionContext,
    ) -> CompileResult<()> {
        ctx.emit_op(Opcode::Nil);
        ctx.emit_op(Opcode::Return);

        if ctx.has_unpatched_jumps() {
            return Err(CompileError::InternalError {
                message: format!("unpatched jump in function {}", name),
            });
        }

        let function = CompiledFunction {
            name: name.clone(),
            arity,
            local_count: ctx.local_count(),
            is_async,
            instructions: ctx.instructions,
            constants: ctx.constants,
        };
        self.functions.insert(name, function);
        Ok(())
    }

    fn next_lambda_name(&mut self) -> String {
        self.lambda_count += 1;
        format!("<lambda#{}>", self.lambda_count)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile `program` with default options.
pub fn compile(program: &Program) -> CompileResult<Bytecode> {
    Compiler::new().compile(program)
}
