//! Constant pool for compiled code

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A literal value stored in a constant pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Constant {
    Integer(i64),
    Float(f64),
    String(String),
    /// Reference to an entry of the function table, by name
    Function(String),
}

/// Hashable identity of a constant: floats compare by bit pattern so
/// `0.0` and `-0.0` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Integer(i64),
    Float(u64),
    String(String),
    Function(String),
}

impl From<&Constant> for ConstantKey {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::Integer(i) => ConstantKey::Integer(*i),
            Constant::Float(x) => ConstantKey::Float(x.to_bits()),
            Constant::String(s) => ConstantKey::String(s.clone()),
            Constant::Function(name) => ConstantKey::Function(name.clone()),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Integer(i) => write!(f, "{}", i),
            Constant::Float(x) => write!(f, "{:?}", x),
            Constant::String(s) => write!(f, "{:?}", s),
            Constant::Function(name) => write!(f, "<fn {}>", name),
        }
    }
}

/// Constant pool containing literal values
///
/// Serialized as a plain list; the dedup index is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Constant>", into = "Vec<Constant>")]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<ConstantKey, usize>,
}

impl ConstantPool {
    /// Create a new empty constant pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant and return its index. Identical constants share a slot.
    pub fn add(&mut self, constant: Constant) -> usize {
        let next = self.constants.len();
        let index = *self.index.entry(ConstantKey::from(&constant)).or_insert(next);
        if index == next {
            self.constants.push(constant);
        }
        index
    }

    /// Get a constant by index
    pub fn get(&self, index: usize) -> Option<&Constant> {
        self.constants.get(index)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.iter()
    }

    pub fn as_slice(&self) -> &[Constant] {
        &self.constants
    }
}

impl PartialEq for ConstantPool {
    fn eq(&self, other: &Self) -> bool {
        self.constants == other.constants
    }
}

impl From<Vec<Constant>> for ConstantPool {
    fn from(constants: Vec<Constant>) -> Self {
        let mut index = FxHashMap::default();
        for (i, constant) in constants.iter().enumerate() {
            index.entry(ConstantKey::from(constant)).or_insert(i);
        }
        Self { constants, index }
    }
}

impl From<ConstantPool> for Vec<Constant> {
    fn from(pool: ConstantPool) -> Self {
        pool.constants
    }
}
