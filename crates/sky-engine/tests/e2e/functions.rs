//! Function declarations, calls, defaults, variadics and lambdas

use super::harness::*;

// ============================================================================
// Declarations and Calls
// ============================================================================

#[test]
fn test_add_returns_sum() {
    expect_int("function add(a, b)\n    return a + b\nend\nadd(2, 3)\n", 5);
}

#[test]
fn test_typed_function() {
    expect_int(
        "function square(x: int): int\n    return x * x\nend\nsquare(3) + square(4)\n",
        25,
    );
}

#[test]
fn test_call_before_declaration() {
    expect_int("twice(21)\nfunction twice(n)\n    return n * 2\nend\n", 42);
}

#[test]
fn test_implicit_return_is_nil() {
    expect_output(
        "function noop()\n    let x = 1\nend\nprint(noop())\n",
        "nil\n",
    );
}

#[test]
fn test_locals_do_not_leak_between_calls() {
    let source = "\
function counter(start)
    let n = start
    n += 1
    return n
end
counter(1) + counter(10)
";
    expect_int(source, 13);
}

#[test]
fn test_nested_calls_restore_caller_stack() {
    let source = "\
function inc(x)
    return x + 1
end
function sum3(a, b, c)
    return a + b + c
end
sum3(inc(1), inc(2), inc(3))
";
    expect_int(source, 9);
}

#[test]
fn test_functions_read_globals() {
    expect_int(
        "let base = 100\nfunction offset(n)\n    return base + n\nend\noffset(5)\n",
        105,
    );
}

// ============================================================================
// Defaults and Variadics
// ============================================================================

#[test]
fn test_default_parameter() {
    let source = "\
function greet(name, greeting = \"hello\")
    return greeting + \", \" + name
end
print(greet(\"sky\"))
print(greet(\"sky\", \"hi\"))
";
    expect_output(source, "hello, sky\nhi, sky\n");
}

#[test]
fn test_default_reads_global_not_caller_local() {
    let source = "\
let x = 10
function f(a = x)
    return a
end
function main()
    let x = \"local\"
    print(f())
end
";
    expect_output(source, "10\n");
}

#[test]
fn test_default_evaluated_inside_nested_caller() {
    let source = "\
let step = 1
function bump(n, by = step)
    return n + by
end
function main()
    let step = 50
    let total = 0
    for i in range(0, 3)
        total = bump(total)
    end
    print(total, step)
end
";
    expect_output(source, "3\n50\n");
}

#[test]
fn test_variadic_parameter_collects_surplus() {
    let source = "\
function count(first, ...rest)
    return len(rest)
end
print(count(1))
print(count(1, 2, 3))
";
    expect_output(source, "0\n2\n");
}

// ============================================================================
// Entry Function
// ============================================================================

#[test]
fn test_main_runs_after_top_level() {
    let source = "\
function main()
    print(\"main\")
end
print(\"top\")
";
    expect_output(source, "top\nmain\n");
}

#[test]
fn test_main_locals() {
    let source = "\
function main()
    let a = 20
    let b = 22
    print(a + b)
end
";
    expect_output(source, "42\n");
}

// ============================================================================
// Lambdas
// ============================================================================

#[test]
fn test_lambda_call_through_global() {
    expect_int("let double = function(x) x * 2 end\ndouble(21)\n", 42);
}

#[test]
fn test_lambda_passed_as_argument() {
    let source = "\
function apply(f, v)
    return f(v)
end
apply(function(x) x + 1 end, 41)
";
    expect_int(source, 42);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_undefined_function() {
    expect_runtime_error("nope(1)\n", "undefined function: nope");
}

#[test]
fn test_calling_a_non_function() {
    expect_runtime_error("let x = 3\nx(1)\n", "not callable");
}

#[test]
fn test_arity_mismatch_through_value() {
    let source = "\
function one(a)
    return a
end
let f = one
f(1, 2)
";
    expect_runtime_error(source, "function one expects 1 arguments, got 2");
}

#[test]
fn test_lambda_in_function_reads_global_not_enclosing_local() {
    let source = "\
let k = 100
function main()
    let k = 3
    let f = function(x) x + k end
    print(f(1))
end
";
    expect_output(source, "101\n");
}

#[test]
fn test_nested_function_reads_global_not_enclosing_local() {
    let source = "\
let k = 100
function outer()
    let k = 3
    function inner()
        return k
    end
    return inner() + k
end
print(outer())
";
    expect_output(source, "103\n");
}
