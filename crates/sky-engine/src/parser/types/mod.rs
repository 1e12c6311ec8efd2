//! Sky type system
//!
//! Types are plain values compared structurally; class definitions live in a
//! [`TypeContext`] arena and are referenced by [`ClassId`].

pub mod assignability;
pub mod context;
pub mod ty;

pub use assignability::AssignabilityContext;
pub use context::{ClassInfo, TypeContext};
pub use ty::{BasicType, ClassId, FunctionType, Type};
