//! Code Generator Context
//!
//! Per-function state during bytecode generation: the instruction buffer,
//! the constant pool, the scope chain mapping names to stack slots, and the
//! enclosing loops for `break`/`continue` patching.

use rustc_hash::FxHashMap;

use crate::compiler::bytecode::{Constant, ConstantPool, Instruction, Opcode};

/// Placeholder operand for jumps whose target is not yet known
const JUMP_PLACEHOLDER: usize = usize::MAX;

/// What kind of code a context produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContextKind {
    /// The entry stream: top-level statements and the body of `main`
    Main,
    /// A named function or lambda with its own frame
    Function,
}

/// Jump bookkeeping for one enclosing loop
#[derive(Debug, Default)]
pub(crate) struct LoopContext {
    /// Address `continue` jumps back to, when already known (while loops)
    pub continue_target: Option<usize>,
    /// Forward `continue` jumps awaiting the increment step (for loops)
    pub continue_jumps: Vec<usize>,
    /// Forward `break` jumps awaiting the loop exit
    pub break_jumps: Vec<usize>,
}

/// Context for compiling a single function
#[derive(Debug)]
pub(crate) struct FunctionContext {
    pub kind: ContextKind,
    pub instructions: Vec<Instruction>,
    pub constants: ConstantPool,
    /// Innermost scope last; each maps a name to its slot
    scopes: Vec<FxHashMap<String, usize>>,
    /// Next available local slot; slots are never reused within a function
    next_slot: usize,
    pub loops: Vec<LoopContext>,
}

impl FunctionContext {
    pub fn main() -> Self {
        Self::new(ContextKind::Main)
    }

    /// A function context whose outermost scope binds `params` to slots 0..n.
    pub fn function<'p>(params: impl IntoIterator<Item = &'p str>) -> Self {
        let mut ctx = Self::new(ContextKind::Function);
        ctx.enter_scope();
        for param in params {
            ctx.define(param);
        }
        ctx
    }

    fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            instructions: Vec::new(),
            constants: ConstantPool::new(),
            scopes: Vec::new(),
            next_slot: 0,
            loops: Vec::new(),
        }
    }

    // ========================================================================
    // Scopes and slots
    // ========================================================================

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn leave_scope(&mut self) {
        self.scopes.pop();
    }

    /// Whether a declaration here defines a global rather than a local.
    pub fn is_global_scope(&self) -> bool {
        self.kind == ContextKind::Main && self.scopes.is_empty()
    }

    /// Bind `name` to a fresh slot in the innermost scope.
    pub fn define(&mut self, name: &str) -> usize {
        let slot = self.next_slot;
        self.next_slot += 1;
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), slot);
        }
        slot
    }

    /// Allocate an unnamed slot for compiler temporaries.
    pub fn hidden_slot(&mut self) -> usize {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    /// Look `name` up through the scope chain, innermost first.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Detach every open scope so only globals and functions resolve.
    /// Hand the result back to `restore_scopes`.
    pub fn hide_scopes(&mut self) -> Vec<FxHashMap<String, usize>> {
        std::mem::take(&mut self.scopes)
    }

    pub fn restore_scopes(&mut self, scopes: Vec<FxHashMap<String, usize>>) {
        self.scopes = scopes;
    }

    /// Total slots allocated so far.
    pub fn local_count(&self) -> usize {
        self.next_slot
    }

    // ========================================================================
    // Emission
    // ========================================================================

    /// Append an instruction and return its address.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    pub fn emit_op(&mut self, opcode: Opcode) -> usize {
        self.emit(Instruction::new(opcode))
    }

    pub fn emit_with(&mut self, opcode: Opcode, operand: usize) -> usize {
        self.emit(Instruction::with_operand(opcode, operand))
    }

    pub fn emit_constant(&mut self, constant: Constant) -> usize {
        let index = self.constants.add(constant);
        self.emit_with(Opcode::Constant, index)
    }

    pub fn emit_get_local(&mut self, slot: usize, name: &str) {
        self.emit(Instruction::with_name(Opcode::GetLocal, slot, name));
    }

    pub fn emit_set_local(&mut self, slot: usize, name: &str) {
        self.emit(Instruction::with_name(Opcode::SetLocal, slot, name));
    }

    /// Emit a forward jump with a placeholder target; patch it later.
    pub fn emit_jump(&mut self, opcode: Opcode) -> usize {
        self.emit_with(opcode, JUMP_PLACEHOLDER)
    }

    /// Point the jump at `position` to the next instruction to be emitted.
    pub fn patch_jump(&mut self, position: usize) {
        let target = self.instructions.len();
        self.patch_jump_to(position, target);
    }

    pub fn patch_jump_to(&mut self, position: usize, target: usize) {
        if let Some(ins) = self.instructions.get_mut(position) {
            ins.operand = target;
        }
    }

    /// Emit a backward jump to an already known address.
    pub fn emit_loop(&mut self, loop_start: usize) {
        self.emit_with(Opcode::Loop, loop_start);
    }

    /// Address of the next instruction.
    pub fn position(&self) -> usize {
        self.instructions.len()
    }

    /// Whether any jump still carries the placeholder target.
    pub fn has_unpatched_jumps(&self) -> bool {
        self.instructions
            .iter()
            .any(|ins| ins.opcode().map_or(false, |op| op.is_jump()) && ins.operand == JUMP_PLACEHOLDER)
    }
}
