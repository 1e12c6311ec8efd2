//! Bytecode opcodes for the Sky VM
//!
//! Every instruction is one opcode plus at most one integer operand and an
//! optional name (globals, callees). Opcodes are grouped by category:
//! - 0x00-0x0F: Stack manipulation & constants
//! - 0x10-0x1F: Local and global variables
//! - 0x20-0x2F: Arithmetic
//! - 0x30-0x3F: Comparison & logical
//! - 0x40-0x4F: Control flow
//! - 0x50-0x5F: Calls & suspension points
//! - 0x60-0x6F: Builtins & collections

/// Bytecode opcode enumeration
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Stack Manipulation & Constants (0x00-0x0F) =====
    /// Push constant from pool (operand: pool index)
    Constant = 0x00,
    /// Pop top value from stack
    Pop = 0x01,
    /// Duplicate top stack value
    Dup = 0x02,
    /// Push true
    True = 0x03,
    /// Push false
    False = 0x04,
    /// Push nil
    Nil = 0x05,

    // ===== Variables (0x10-0x1F) =====
    /// Push local slot (operand: slot, relative to frame base)
    GetLocal = 0x10,
    /// Pop into local slot (operand: slot)
    SetLocal = 0x11,
    /// Push global (name: variable name)
    GetGlobal = 0x12,
    /// Pop into global (name: variable name)
    SetGlobal = 0x13,

    // ===== Arithmetic (0x20-0x2F) =====
    /// pop b, pop a, push a + b
    Add = 0x20,
    /// pop b, pop a, push a - b
    Sub = 0x21,
    /// pop b, pop a, push a * b
    Mul = 0x22,
    /// pop b, pop a, push a / b
    Div = 0x23,
    /// pop b, pop a, push a % b
    Mod = 0x24,
    /// pop b, pop a, push a ** b
    Pow = 0x25,
    /// pop a, push -a
    Negate = 0x26,

    // ===== Comparison & Logical (0x30-0x3F) =====
    Equal = 0x30,
    NotEqual = 0x31,
    Greater = 0x32,
    GreaterEq = 0x33,
    Less = 0x34,
    LessEq = 0x35,
    /// pop a, push !truthy(a)
    Not = 0x36,

    // ===== Control Flow (0x40-0x4F) =====
    /// Unconditional jump (operand: absolute address)
    Jump = 0x40,
    /// Pop condition, jump if falsy (operand: absolute address)
    JumpIfFalse = 0x41,
    /// Pop condition, jump if truthy (operand: absolute address)
    JumpIfTrue = 0x42,
    /// Backward jump (operand: absolute address)
    Loop = 0x43,
    /// Stop execution
    Halt = 0x44,

    // ===== Calls (0x50-0x5F) =====
    /// Call callee below the arguments (operand: argument count)
    Call = 0x50,
    /// Pop result, leave the frame, push result
    Return = 0x51,
    /// Pass-through suspension point
    Await = 0x52,
    /// Pass-through suspension point
    Yield = 0x53,

    // ===== Builtins & Collections (0x60-0x6F) =====
    /// Print N values, one per line (operand: value count)
    Print = 0x60,
    /// pop a, push len(a)
    Len = 0x61,
    /// Build an integer list (operand: 1 or 2 bounds)
    Range = 0x62,
    /// Pop N values into a list (operand: element count)
    BuildList = 0x63,
    /// Pop N key/value pairs into a dict (operand: pair count)
    BuildDict = 0x64,
    /// pop index, pop container, push container[index]
    Index = 0x65,
    /// pop iterable, push its snapshot as a list
    GetIter = 0x66,
}

impl Opcode {
    /// Decode an opcode byte. Returns `None` for unassigned bytes.
    pub fn from_u8(byte: u8) -> Option<Self> {
        let op = match byte {
            0x00 => Self::Constant,
            0x01 => Self::Pop,
            0x02 => Self::Dup,
            0x03 => Self::True,
            0x04 => Self::False,
            0x05 => Self::Nil,

            0x10 => Self::GetLocal,
            0x11 => Self::SetLocal,
            0x12 => Self::GetGlobal,
            0x13 => Self::SetGlobal,

            0x20 => Self::Add,
            0x21 => Self::Sub,
            0x22 => Self::Mul,
            0x23 => Self::Div,
            0x24 => Self::Mod,
            0x25 => Self::Pow,
            0x26 => Self::Negate,

            0x30 => Self::Equal,
            0x31 => Self::NotEqual,
            0x32 => Self::Greater,
            0x33 => Self::GreaterEq,
            0x34 => Self::Less,
            0x35 => Self::LessEq,
            0x36 => Self::Not,

            0x40 => Self::Jump,
            0x41 => Self::JumpIfFalse,
            0x42 => Self::JumpIfTrue,
            0x43 => Self::Loop,
            0x44 => Self::Halt,

            0x50 => Self::Call,
            0x51 => Self::Return,
            0x52 => Self::Await,
            0x53 => Self::Yield,

            0x60 => Self::Print,
            0x61 => Self::Len,
            0x62 => Self::Range,
            0x63 => Self::BuildList,
            0x64 => Self::BuildDict,
            0x65 => Self::Index,
            0x66 => Self::GetIter,

            _ => return None,
        };
        Some(op)
    }

    /// Convert opcode to byte
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the name of this opcode (for disassembly and traces)
    pub fn name(self) -> &'static str {
        match self {
            Self::Constant => "CONSTANT",
            Self::Pop => "POP",
            Self::Dup => "DUP",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Nil => "NIL",
            Self::GetLocal => "GET_LOCAL",
            Self::SetLocal => "SET_LOCAL",
            Self::GetGlobal => "GET_GLOBAL",
            Self::SetGlobal => "SET_GLOBAL",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Pow => "POW",
            Self::Negate => "NEGATE",
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::Greater => "GREATER",
            Self::GreaterEq => "GREATER_EQ",
            Self::Less => "LESS",
            Self::LessEq => "LESS_EQ",
            Self::Not => "NOT",
            Self::Jump => "JUMP",
            Self::JumpIfFalse => "JUMP_IF_FALSE",
            Self::JumpIfTrue => "JUMP_IF_TRUE",
            Self::Loop => "LOOP",
            Self::Halt => "HALT",
            Self::Call => "CALL",
            Self::Return => "RETURN",
            Self::Await => "AWAIT",
            Self::Yield => "YIELD",
            Self::Print => "PRINT",
            Self::Len => "LEN",
            Self::Range => "RANGE",
            Self::BuildList => "BUILD_LIST",
            Self::BuildDict => "BUILD_DICT",
            Self::Index => "INDEX",
            Self::GetIter => "GET_ITER",
        }
    }

    /// Whether the integer operand is meaningful for this opcode.
    pub fn has_operand(self) -> bool {
        matches!(
            self,
            Self::Constant
                | Self::GetLocal
                | Self::SetLocal
                | Self::Call
                | Self::Print
                | Self::Range
                | Self::BuildList
                | Self::BuildDict
        ) || self.is_jump()
    }

    /// Whether the instruction carries a name operand.
    pub fn has_name(self) -> bool {
        matches!(self, Self::GetGlobal | Self::SetGlobal)
    }

    /// Check if this is a jump instruction
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Self::Jump | Self::JumpIfFalse | Self::JumpIfTrue | Self::Loop
        )
    }

    /// Check if this instruction ends a straight-line run of code
    pub fn is_terminator(self) -> bool {
        matches!(self, Self::Return | Self::Halt | Self::Jump | Self::Loop)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
