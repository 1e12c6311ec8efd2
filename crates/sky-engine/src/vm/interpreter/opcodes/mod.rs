//! Opcode handler modules for the VM interpreter
//!
//! Each module implements a category of opcode handlers as methods on `Interpreter`.

pub mod arithmetic;
pub mod builtins;
pub mod calls;
pub mod comparison;
pub mod control_flow;
pub mod stack;
pub mod variables;
