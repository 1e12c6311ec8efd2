use crate::compiler::bytecode::Opcode;
use crate::vm::interpreter::{Interpreter, OpcodeResult};
use crate::vm::stack::Stack;
use crate::vm::value::Value;
use crate::vm::{VmError, VmResult};

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(in crate::vm::interpreter) fn exec_arithmetic_ops(
        &mut self,
        stack: &mut Stack,
        opcode: Opcode,
    ) -> OpcodeResult {
        match opcode {
            Opcode::Negate => {
                let a = match stack.pop() {
                    Ok(v) => v,
                    Err(e) => return OpcodeResult::Error(e),
                };
                negate(a).map(|v| stack.push(v)).into()
            }

            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod | Opcode::Pow => {
                let b = match stack.pop() {
                    Ok(v) => v,
                    Err(e) => return OpcodeResult::Error(e),
                };
                let a = match stack.pop() {
                    Ok(v) => v,
                    Err(e) => return OpcodeResult::Error(e),
                };
                binary(opcode, a, b).map(|v| stack.push(v)).into()
            }

            _ => unreachable!("Not an arithmetic opcode: {:?}", opcode),
        }
    }
}

fn symbol(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::Add => "+",
        Opcode::Sub => "-",
        Opcode::Mul => "*",
        Opcode::Div => "/",
        Opcode::Mod => "%",
        Opcode::Pow => "**",
        _ => "?",
    }
}

/// Apply a binary arithmetic opcode to `a` and `b`.
pub(in crate::vm::interpreter) fn binary(opcode: Opcode, a: Value, b: Value) -> VmResult<Value> {
    let op = symbol(opcode);
    match (&a, &b) {
        (Value::Integer(x), Value::Integer(y)) => integer_op(opcode, op, *x, *y),

        // A string on either side of `+` concatenates with the other side's
        // printed form.
        (Value::String(_), _) | (_, Value::String(_)) if opcode == Opcode::Add => {
            Ok(Value::string(format!("{}{}", a, b)))
        }

        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(float_op(opcode, x, y))),
            _ => Err(VmError::UnsupportedOperands {
                op,
                left: a.type_name(),
                right: b.type_name(),
            }),
        },
    }
}

fn integer_op(opcode: Opcode, op: &'static str, x: i64, y: i64) -> VmResult<Value> {
    let result = match opcode {
        Opcode::Add => x.checked_add(y),
        Opcode::Sub => x.checked_sub(y),
        Opcode::Mul => x.checked_mul(y),
        Opcode::Div => {
            if y == 0 {
                return Err(VmError::DivisionByZero);
            }
            x.checked_div(y)
        }
        Opcode::Mod => {
            if y == 0 {
                return Err(VmError::DivisionByZero);
            }
            x.checked_rem(y)
        }
        Opcode::Pow => {
            // Negative exponents leave the integers
            let Ok(exp) = u32::try_from(y) else {
                if y < 0 {
                    return Ok(Value::Float((x as f64).powf(y as f64)));
                }
                return Err(VmError::IntegerOverflow(op));
            };
            x.checked_pow(exp)
        }
        _ => None,
    };
    result
        .map(Value::Integer)
        .ok_or(VmError::IntegerOverflow(op))
}

fn float_op(opcode: Opcode, x: f64, y: f64) -> f64 {
    match opcode {
        Opcode::Add => x + y,
        Opcode::Sub => x - y,
        Opcode::Mul => x * y,
        Opcode::Div => x / y,
        Opcode::Mod => x % y,
        Opcode::Pow => x.powf(y),
        _ => f64::NAN,
    }
}

fn negate(a: Value) -> VmResult<Value> {
    match a {
        Value::Integer(x) => x
            .checked_neg()
            .map(Value::Integer)
            .ok_or(VmError::IntegerOverflow("-")),
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(VmError::UnsupportedOperand {
            op: "-",
            operand: other.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        let seven = Value::Integer(7);
        let two = Value::Integer(2);
        assert_eq!(binary(Opcode::Add, seven.clone(), two.clone()), Ok(Value::Integer(9)));
        assert_eq!(binary(Opcode::Div, seven.clone(), two.clone()), Ok(Value::Integer(3)));
        assert_eq!(binary(Opcode::Mod, seven.clone(), two.clone()), Ok(Value::Integer(1)));
        assert_eq!(binary(Opcode::Pow, seven, two), Ok(Value::Integer(49)));
    }

    #[test]
    fn test_mixed_promotes_to_float() {
        assert_eq!(
            binary(Opcode::Mul, Value::Integer(2), Value::Float(1.5)),
            Ok(Value::Float(3.0))
        );
        assert_eq!(
            binary(Opcode::Pow, Value::Integer(2), Value::Integer(-1)),
            Ok(Value::Float(0.5))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            binary(Opcode::Div, Value::Integer(1), Value::Integer(0)),
            Err(VmError::DivisionByZero)
        );
        assert_eq!(
            binary(Opcode::Mod, Value::Integer(1), Value::Integer(0)),
            Err(VmError::DivisionByZero)
        );
        // Floats follow IEEE
        let result = binary(Opcode::Div, Value::Float(1.0), Value::Float(0.0)).unwrap();
        assert_eq!(result, Value::Float(f64::INFINITY));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert_eq!(
            binary(Opcode::Add, Value::Integer(i64::MAX), Value::Integer(1)),
            Err(VmError::IntegerOverflow("+"))
        );
        assert_eq!(negate(Value::Integer(i64::MIN)), Err(VmError::IntegerOverflow("-")));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            binary(Opcode::Add, Value::string("n="), Value::Integer(3)),
            Ok(Value::string("n=3"))
        );
        assert_eq!(
            binary(Opcode::Add, Value::Float(1.5), Value::string("x")),
            Ok(Value::string("1.5x"))
        );
    }

    #[test]
    fn test_unsupported_operands() {
        let err = binary(Opcode::Sub, Value::string("a"), Value::Integer(1)).unwrap_err();
        assert_eq!(err.to_string(), "unsupported operands for -: string and int");
        let err = negate(Value::Nil).unwrap_err();
        assert_eq!(err.to_string(), "unsupported operand for -: nil");
    }
}
