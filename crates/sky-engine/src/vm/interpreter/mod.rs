//! Bytecode interpreter
//!
//! [`Vm`] owns the state that outlives a run (globals, output sinks, the
//! last popped value). Each [`Vm::run`] builds an [`Interpreter`] over the
//! bytecode's chunk table and drives it to `HALT` or the first error.

mod core;
mod execution;
mod opcodes;

use std::io::{self, Write};

use rustc_hash::FxHashMap;

use crate::compiler::bytecode::{Bytecode, ConstantPool, Instruction};
use crate::vm::stack::Stack;
use crate::vm::value::Value;
use crate::vm::{VmOptions, VmResult};

pub(crate) use execution::OpcodeResult;

/// Chunk name used for the entry stream in traces
pub const MAIN_CHUNK: &str = "<main>";

/// One executable instruction stream
pub(in crate::vm::interpreter) struct Chunk<'b> {
    pub name: &'b str,
    pub arity: usize,
    pub local_count: usize,
    pub instructions: &'b [Instruction],
    pub constants: &'b ConstantPool,
}

/// The VM
pub struct Vm {
    options: VmOptions,
    globals: FxHashMap<String, Value>,
    output: Box<dyn Write>,
    trace: Box<dyn Write>,
    last_popped: Value,
}

impl std::fmt::Debug for Vm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vm")
            .field("options", &self.options)
            .field("globals", &self.globals)
            .field("last_popped", &self.last_popped)
            .finish_non_exhaustive()
    }
}

impl Vm {
    /// A VM printing to stdout and tracing to stderr
    pub fn new(options: VmOptions) -> Self {
        Self {
            options,
            globals: FxHashMap::default(),
            output: Box::new(io::stdout()),
            trace: Box::new(io::stderr()),
            last_popped: Value::Nil,
        }
    }

    /// Redirect `print` output.
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Redirect the instruction trace.
    pub fn with_trace_output(mut self, trace: impl Write + 'static) -> Self {
        self.trace = Box::new(trace);
        self
    }

    pub fn options(&self) -> VmOptions {
        self.options
    }

    /// Execute `bytecode` from its first entry instruction.
    ///
    /// Globals persist across runs on the same VM.
    pub fn run(&mut self, bytecode: &Bytecode) -> VmResult<()> {
        let mut chunks = Vec::with_capacity(bytecode.functions.len() + 1);
        chunks.push(Chunk {
            name: MAIN_CHUNK,
            arity: 0,
            local_count: bytecode.local_count,
            instructions: &bytecode.instructions,
            constants: &bytecode.constants,
        });
        for function in bytecode.functions.values() {
            chunks.push(Chunk {
                name: &function.name,
                arity: function.arity,
                local_count: function.local_count,
                instructions: &function.instructions,
                constants: &function.constants,
            });
        }
        let function_index = chunks
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, chunk)| (chunk.name, index))
            .collect();

        let mut interpreter = Interpreter {
            chunks,
            function_index,
            globals: &mut self.globals,
            output: &mut self.output,
            trace: if self.options.trace {
                Some(&mut self.trace)
            } else {
                None
            },
            last_popped: &mut self.last_popped,
        };

        let mut stack = Stack::with_max_frames(self.options.max_frames);
        let result = interpreter.execute(&mut stack);
        self.output.flush()?;
        result
    }

    /// Value of a global variable
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> &FxHashMap<String, Value> {
        &self.globals
    }

    /// Value discarded by the most recent `POP`
    pub fn last_popped(&self) -> &Value {
        &self.last_popped
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(VmOptions::default())
    }
}

/// Execution state for one run
pub(in crate::vm::interpreter) struct Interpreter<'a, 'b> {
    /// Entry stream at index 0, then functions in name order
    pub(in crate::vm::interpreter) chunks: Vec<Chunk<'b>>,
    pub(in crate::vm::interpreter) function_index: FxHashMap<&'b str, usize>,
    pub(in crate::vm::interpreter) globals: &'a mut FxHashMap<String, Value>,
    pub(in crate::vm::interpreter) output: &'a mut Box<dyn Write>,
    pub(in crate::vm::interpreter) trace: Option<&'a mut Box<dyn Write>>,
    pub(in crate::vm::interpreter) last_popped: &'a mut Value,
}
