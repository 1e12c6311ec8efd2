//! Arithmetic, comparison, logical and assignment operators

use super::harness::*;
use sky_engine::Value;

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_precedence() {
    expect_int("1 + 2 * 3\n", 7);
    expect_int("(1 + 2) * 3\n", 9);
    expect_int("2 ** 3 ** 2\n", 512);
}

#[test]
fn test_integer_division_truncates() {
    expect_int("7 / 2\n", 3);
    expect_int("-7 / 2\n", -3);
    expect_int("7 % 3\n", 1);
}

#[test]
fn test_float_promotion() {
    expect_value("7.0 / 2\n", Value::Float(3.5));
    expect_value("1 + 0.5\n", Value::Float(1.5));
    expect_value("2 ** -1\n", Value::Float(0.5));
}

#[test]
fn test_unary_minus() {
    expect_int("let x = 5\n-x\n", -5);
    expect_value("-2.5\n", Value::Float(-2.5));
}

#[test]
fn test_string_concatenation_stringifies() {
    expect_output("print(\"n=\" + 3)\nprint(1.5 + \"x\")\n", "n=3\n1.5x\n");
}

// ============================================================================
// Comparison and Logic
// ============================================================================

#[test]
fn test_comparisons() {
    expect_value("1 < 2\n", Value::Bool(true));
    expect_value("2 >= 2.0\n", Value::Bool(true));
    expect_value("\"abc\" < \"abd\"\n", Value::Bool(true));
    expect_value("1 == 1.0\n", Value::Bool(true));
    expect_value("\"1\" != 1\n", Value::Bool(true));
}

#[test]
fn test_logical_values() {
    expect_value("true && false\n", Value::Bool(false));
    expect_value("false || true\n", Value::Bool(true));
    expect_value("!true\n", Value::Bool(false));
    expect_value("not false\n", Value::Bool(true));
}

#[test]
fn test_short_circuit_skips_right_operand() {
    let source = "\
function loud()
    print(\"called\")
    return true
end
false && loud()
true || loud()
true && loud()
";
    expect_output(source, "called\n");
}

// ============================================================================
// Assignment
// ============================================================================

#[test]
fn test_assignment_updates_global() {
    expect_int("let x = 1\nx = 5\nx\n", 5);
}

#[test]
fn test_compound_assignment_order() {
    expect_int("let x = 10\nx -= 3\nx\n", 7);
    expect_int("let x = 10\nx /= 4\nx\n", 2);
    expect_int("let x = 10\nx %= 4\nx\n", 2);
}

#[test]
fn test_compound_assignment_on_local() {
    let source = "\
function main()
    let total = 0
    for i in range(5)
        total += i
    end
    print(total)
end
";
    expect_output(source, "10\n");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_division_by_zero() {
    expect_runtime_error("1 / 0\n", "division by zero");
    expect_runtime_error("1 % 0\n", "division by zero");
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    expect_output("print(1.0 / 0)\n", "inf\n");
}

#[test]
fn test_integer_overflow() {
    expect_runtime_error("9223372036854775807 + 1\n", "integer overflow");
}

#[test]
fn test_unsupported_operands() {
    expect_runtime_error("\"a\" - 1\n", "unsupported operands for -: string and int");
    expect_runtime_error("[1] < [2]\n", "unsupported operands for <: list and list");
}
