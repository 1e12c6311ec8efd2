use std::collections::BTreeMap;
use std::io::Write;

use crate::compiler::bytecode::{Instruction, Opcode};
use crate::vm::interpreter::{Interpreter, OpcodeResult};
use crate::vm::stack::Stack;
use crate::vm::value::Value;
use crate::vm::{VmError, VmResult, MAX_RANGE_LEN};

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(in crate::vm::interpreter) fn exec_builtin_ops(
        &mut self,
        stack: &mut Stack,
        ins: &Instruction,
        opcode: Opcode,
    ) -> OpcodeResult {
        let result = match opcode {
            Opcode::Print => self.print(stack, ins.operand),
            Opcode::Len => stack.pop().and_then(|v| len(&v)).map(|v| stack.push(v)),
            Opcode::Range => stack
                .pop_n(ins.operand)
                .and_then(|args| range(&args))
                .map(|v| stack.push(v)),
            Opcode::BuildList => stack
                .pop_n(ins.operand)
                .map(|items| stack.push(Value::list(items))),
            Opcode::BuildDict => stack
                .pop_n(ins.operand * 2)
                .and_then(build_dict)
                .map(|v| stack.push(v)),
            Opcode::Index => stack
                .pop_n(2)
                .and_then(|pair| index(&pair[0], &pair[1]))
                .map(|v| stack.push(v)),
            Opcode::GetIter => stack.pop().and_then(iterate).map(|v| stack.push(v)),
            _ => unreachable!("Not a builtin opcode: {:?}", opcode),
        };
        result.into()
    }

    /// Write each argument on its own line and push `nil`.
    fn print(&mut self, stack: &mut Stack, argc: usize) -> VmResult<()> {
        let args = stack.pop_n(argc)?;
        for arg in &args {
            writeln!(self.output, "{}", arg)?;
        }
        stack.push(Value::Nil);
        Ok(())
    }
}

fn len(value: &Value) -> VmResult<Value> {
    let n = match value {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Dict(entries) => entries.len(),
        other => {
            return Err(VmError::UnsupportedOperand {
                op: "len",
                operand: other.type_name(),
            })
        }
    };
    i64::try_from(n)
        .map(Value::Integer)
        .map_err(|_| VmError::IntegerOverflow("len"))
}

/// `range(end)` or `range(start, end)`, half open.
fn range(args: &[Value]) -> VmResult<Value> {
    let bound = |v: &Value| {
        v.as_int().ok_or(VmError::UnsupportedOperand {
            op: "range",
            operand: v.type_name(),
        })
    };
    let (start, end) = match args {
        [end] => (0, bound(end)?),
        [start, end] => (bound(start)?, bound(end)?),
        _ => return Err(VmError::StackUnderflow),
    };
    let len = i128::from(end) - i128::from(start);
    if len > MAX_RANGE_LEN as i128 {
        return Err(VmError::RangeTooLarge {
            len,
            limit: MAX_RANGE_LEN,
        });
    }
    Ok(Value::list((start..end).map(Value::Integer).collect()))
}

/// Build a dict from alternating keys and values.
fn build_dict(flat: Vec<Value>) -> VmResult<Value> {
    let mut entries = BTreeMap::new();
    let mut iter = flat.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        let key = key
            .to_key()
            .ok_or(VmError::UnhashableKey(key.type_name()))?;
        entries.insert(key, value);
    }
    Ok(Value::dict(entries))
}

fn index(container: &Value, key: &Value) -> VmResult<Value> {
    match (container, key) {
        (Value::List(items), Value::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|at| items.get(at))
            .cloned()
            .ok_or(VmError::IndexOutOfRange {
                index: *i,
                len: items.len(),
            }),
        (Value::String(s), Value::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|at| s.chars().nth(at))
            .map(|c| Value::string(c.to_string()))
            .ok_or_else(|| VmError::IndexOutOfRange {
                index: *i,
                len: s.chars().count(),
            }),
        (Value::Dict(entries), key) => {
            let dict_key = key
                .to_key()
                .ok_or(VmError::UnhashableKey(key.type_name()))?;
            entries
                .get(&dict_key)
                .cloned()
                .ok_or_else(|| VmError::KeyNotFound(dict_key.to_string()))
        }
        (container, key) => Err(VmError::UnsupportedOperands {
            op: "[]",
            left: container.type_name(),
            right: key.type_name(),
        }),
    }
}

/// Snapshot an iterable as a list: lists as-is, strings as characters,
/// dicts as their keys in key order.
fn iterate(value: Value) -> VmResult<Value> {
    match value {
        Value::List(_) => Ok(value),
        Value::String(s) => Ok(Value::list(
            s.chars().map(|c| Value::string(c.to_string())).collect(),
        )),
        Value::Dict(entries) => Ok(Value::list(
            entries.keys().cloned().map(Value::from).collect(),
        )),
        other => Err(VmError::NotIterable(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        assert_eq!(len(&Value::string("héllo")), Ok(Value::Integer(5)));
        assert_eq!(
            len(&Value::list(vec![Value::Nil, Value::Nil])),
            Ok(Value::Integer(2))
        );
        assert!(len(&Value::Integer(3)).is_err());
    }

    #[test]
    fn test_range() {
        assert_eq!(
            range(&[Value::Integer(3)]),
            Ok(Value::list(vec![
                Value::Integer(0),
                Value::Integer(1),
                Value::Integer(2)
            ]))
        );
        assert_eq!(
            range(&[Value::Integer(5), Value::Integer(7)]),
            Ok(Value::list(vec![Value::Integer(5), Value::Integer(6)]))
        );
        assert_eq!(
            range(&[Value::Integer(3), Value::Integer(1)]),
            Ok(Value::list(vec![]))
        );
    }

    #[test]
    fn test_range_length_is_capped() {
        let limit = MAX_RANGE_LEN as i64;
        assert_eq!(
            range(&[Value::Integer(limit + 1)]),
            Err(VmError::RangeTooLarge {
                len: limit as i128 + 1,
                limit: MAX_RANGE_LEN,
            })
        );
        assert_eq!(
            range(&[Value::Integer(i64::MIN), Value::Integer(i64::MAX)]),
            Err(VmError::RangeTooLarge {
                len: u64::MAX as i128,
                limit: MAX_RANGE_LEN,
            })
        );
    }

    #[test]
    fn test_index() {
        let list = Value::list(vec![Value::Integer(10), Value::Integer(20)]);
        assert_eq!(index(&list, &Value::Integer(1)), Ok(Value::Integer(20)));
        assert_eq!(
            index(&list, &Value::Integer(2)),
            Err(VmError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            index(&list, &Value::Integer(-1)),
            Err(VmError::IndexOutOfRange { index: -1, len: 2 })
        );
        assert_eq!(
            index(&Value::string("abc"), &Value::Integer(1)),
            Ok(Value::string("b"))
        );
    }

    #[test]
    fn test_dict_build_and_lookup() {
        let dict = build_dict(vec![
            Value::string("b"),
            Value::Integer(2),
            Value::string("a"),
            Value::Integer(1),
        ])
        .unwrap();
        assert_eq!(index(&dict, &Value::string("a")), Ok(Value::Integer(1)));
        assert_eq!(
            index(&dict, &Value::string("z")).unwrap_err().to_string(),
            "key not found: \"z\""
        );
        assert_eq!(
            iterate(dict),
            Ok(Value::list(vec![Value::string("a"), Value::string("b")]))
        );
    }

    #[test]
    fn test_unhashable_key() {
        let err = build_dict(vec![Value::Float(1.0), Value::Nil]).unwrap_err();
        assert_eq!(err, VmError::UnhashableKey("float"));
    }

    #[test]
    fn test_iterate_string_and_errors() {
        assert_eq!(
            iterate(Value::string("ab")),
            Ok(Value::list(vec![Value::string("a"), Value::string("b")]))
        );
        assert_eq!(iterate(Value::Integer(1)), Err(VmError::NotIterable("int")));
    }
}
