use std::cmp::Ordering;

use crate::compiler::bytecode::Opcode;
use crate::vm::interpreter::{Interpreter, OpcodeResult};
use crate::vm::stack::Stack;
use crate::vm::value::Value;
use crate::vm::{VmError, VmResult};

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(in crate::vm::interpreter) fn exec_comparison_ops(
        &mut self,
        stack: &mut Stack,
        opcode: Opcode,
    ) -> OpcodeResult {
        if opcode == Opcode::Not {
            return stack
                .pop()
                .map(|v| stack.push(Value::Bool(!v.is_truthy())))
                .into();
        }

        let b = match stack.pop() {
            Ok(v) => v,
            Err(e) => return OpcodeResult::Error(e),
        };
        let a = match stack.pop() {
            Ok(v) => v,
            Err(e) => return OpcodeResult::Error(e),
        };
        compare(opcode, &a, &b)
            .map(|result| stack.push(Value::Bool(result)))
            .into()
    }
}

/// Evaluate a comparison opcode. Equality is defined for every pair of
/// values; ordering only for numbers and strings.
pub(in crate::vm::interpreter) fn compare(opcode: Opcode, a: &Value, b: &Value) -> VmResult<bool> {
    let (op, accept): (&'static str, fn(Ordering) -> bool) = match opcode {
        Opcode::Equal => return Ok(a == b),
        Opcode::NotEqual => return Ok(a != b),
        Opcode::Greater => (">", Ordering::is_gt),
        Opcode::GreaterEq => (">=", Ordering::is_ge),
        Opcode::Less => ("<", Ordering::is_lt),
        Opcode::LessEq => ("<=", Ordering::is_le),
        _ => unreachable!("Not a comparison opcode: {:?}", opcode),
    };

    match a.compare(b) {
        Some(ordering) => Ok(accept(ordering)),
        // NaN compares false against everything
        None if a.as_f64().is_some() && b.as_f64().is_some() => Ok(false),
        None => Err(VmError::UnsupportedOperands {
            op,
            left: a.type_name(),
            right: b.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert_eq!(compare(Opcode::Less, &Value::Integer(1), &Value::Integer(2)), Ok(true));
        assert_eq!(compare(Opcode::GreaterEq, &Value::Float(2.0), &Value::Integer(2)), Ok(true));
        assert_eq!(
            compare(Opcode::Greater, &Value::string("abc"), &Value::string("abd")),
            Ok(false)
        );
    }

    #[test]
    fn test_equality_across_kinds() {
        assert_eq!(compare(Opcode::Equal, &Value::Integer(1), &Value::string("1")), Ok(false));
        assert_eq!(compare(Opcode::NotEqual, &Value::Nil, &Value::Bool(false)), Ok(true));
        let list = Value::list(vec![Value::Integer(1)]);
        assert_eq!(compare(Opcode::Equal, &list, &list.clone()), Ok(true));
    }

    #[test]
    fn test_unordered_kinds() {
        let err = compare(Opcode::Less, &Value::Nil, &Value::Integer(1)).unwrap_err();
        assert_eq!(err.to_string(), "unsupported operands for <: nil and int");
    }

    #[test]
    fn test_nan_is_unordered() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(compare(Opcode::Less, &nan, &Value::Float(1.0)), Ok(false));
    }
}
