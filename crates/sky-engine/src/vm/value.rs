//! Runtime values
//!
//! Values are reference counted where they own heap data, so copying a
//! value onto the stack or into a local is cheap. Lists and dicts are
//! immutable once built.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::compiler::bytecode::Constant;

/// A value on the VM stack
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    List(Rc<Vec<Value>>),
    Dict(Rc<BTreeMap<DictKey, Value>>),
    /// Reference to a function in the bytecode's function table
    Function(Rc<str>),
}

/// Values usable as dict keys
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DictKey {
    Bool(bool),
    Integer(i64),
    String(Rc<str>),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn dict(entries: BTreeMap<DictKey, Value>) -> Self {
        Value::Dict(Rc::new(entries))
    }

    /// Name of the value's kind as shown in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
        }
    }

    /// `nil`, `false`, `0` and `0.0` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            _ => true,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a dict key, if it is hashable
    pub fn to_key(&self) -> Option<DictKey> {
        match self {
            Value::Bool(b) => Some(DictKey::Bool(*b)),
            Value::Integer(i) => Some(DictKey::Integer(*i)),
            Value::String(s) => Some(DictKey::String(s.clone())),
            _ => None,
        }
    }

    /// Ordering for the relational operators: numbers (with promotion) and
    /// strings. `None` for any other combination.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                a.partial_cmp(&b)
            }
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s.as_ref()),
            other => write!(f, "{}", other),
        }
    }
}

/// Structural equality; integers and floats compare numerically and
/// unrelated kinds are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&Constant> for Value {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::Integer(i) => Value::Integer(*i),
            Constant::Float(f) => Value::Float(*f),
            Constant::String(s) => Value::string(s.as_str()),
            Constant::Function(name) => Value::Function(name.as_str().into()),
        }
    }
}

impl From<DictKey> for Value {
    fn from(key: DictKey) -> Self {
        match key {
            DictKey::Bool(b) => Value::Bool(b),
            DictKey::Integer(i) => Value::Integer(i),
            DictKey::String(s) => Value::String(s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

/// Strings render raw at the top level and quoted inside containers.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    value.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
            Value::Function(name) => write!(f, "<fn {}>", name),
        }
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictKey::Bool(b) => write!(f, "{}", b),
            DictKey::Integer(i) => write!(f, "{}", i),
            DictKey::String(s) => write!(f, "{:?}", s.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
    }

    #[test]
    fn test_numeric_equality_promotes() {
        assert_eq!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Integer(1), Value::string("1"));
        assert_ne!(Value::Nil, Value::Bool(false));
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Value::Integer(1).compare(&Value::Float(1.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::string("b").compare(&Value::string("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Integer(1).compare(&Value::string("a")), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        let list = Value::list(vec![Value::Integer(1), Value::string("a"), Value::Nil]);
        assert_eq!(list.to_string(), "[1, \"a\", nil]");

        let mut entries = BTreeMap::new();
        entries.insert(DictKey::String("b".into()), Value::Integer(2));
        entries.insert(DictKey::String("a".into()), Value::list(vec![]));
        assert_eq!(Value::dict(entries).to_string(), "{\"a\": [], \"b\": 2}");
    }

    #[test]
    fn test_unhashable_keys() {
        assert!(Value::Float(1.0).to_key().is_none());
        assert!(Value::list(vec![]).to_key().is_none());
        assert_eq!(Value::Integer(3).to_key(), Some(DictKey::Integer(3)));
    }
}
