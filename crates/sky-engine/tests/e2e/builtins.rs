//! print, len and range

use super::harness::*;
use sky_engine::VmError;

#[test]
fn test_print_one_line_per_argument() {
    expect_output("print(1, \"two\", 3.5)\n", "1\ntwo\n3.5\n");
}

#[test]
fn test_print_returns_nil() {
    expect_output("print(print(\"x\"))\n", "x\nnil\n");
}

#[test]
fn test_print_scalars() {
    expect_output(
        "print(true)\nprint(nil)\nprint(0.1 + 0.2)\nprint(-0)\n",
        "true\nnil\n0.30000000000000004\n0\n",
    );
}

#[test]
fn test_len() {
    expect_int("len(\"héllo\")\n", 5);
    expect_int("len([1, 2, 3])\n", 3);
    expect_int("len({\"a\": 1})\n", 1);
    expect_int("len([])\n", 0);
}

#[test]
fn test_range() {
    expect_output("print(range(3))\nprint(range(2, 5))\nprint(range(5, 2))\n", "[0, 1, 2]\n[2, 3, 4]\n[]\n");
}

#[test]
fn test_huge_range_fails_before_allocating() {
    let err = expect_runtime_error(
        "for i in range(-9223372036854775807, 9223372036854775807)\n    print(i)\nend\n",
        "exceeds the limit of 10000000",
    );
    assert!(matches!(err, VmError::RangeTooLarge { .. }));
}

#[test]
fn test_len_of_number_fails() {
    expect_runtime_error("len(3)\n", "unsupported operand for len: int");
}

#[test]
fn test_builtins_can_be_shadowed_by_locals() {
    let source = "\
function apply(print)
    return print(2)
end
apply(function(x) x * 10 end)
";
    expect_int(source, 20);
}
