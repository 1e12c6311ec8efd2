//! Recursion and the frame limit

use super::harness::*;
use sky_engine::{Value, VmError, VmOptions};

const DOWN: &str = "\
function down(n)
    if n == 0
        return 0
    end
    return down(n - 1)
end
";

#[test]
fn test_fibonacci() {
    let source = "\
function fib(n)
    if n < 2
        return n
    end
    return fib(n - 1) + fib(n - 2)
end
fib(15)
";
    expect_int(source, 610);
}

#[test]
fn test_factorial() {
    let source = "\
function fact(n: int): int
    if n <= 1
        return 1
    end
    return n * fact(n - 1)
end
fact(20)
";
    expect_int(source, 2_432_902_008_176_640_000);
}

#[test]
fn test_mutual_recursion() {
    let source = "\
function even(n: int): bool
    if n == 0
        return true
    end
    return odd(n - 1)
end
function odd(n: int): bool
    if n == 0
        return false
    end
    return even(n - 1)
end
even(100)
";
    let run = run_source(source);
    assert_eq!(run.result, Ok(()));
    assert_eq!(run.last, Value::Bool(true));
}

#[test]
fn test_deep_recursion_within_default_limit() {
    // main + 1001 activations of down
    expect_int(&format!("{}down(1000)\n", DOWN), 0);
}

#[test]
fn test_frame_limit_boundary() {
    let options = VmOptions {
        max_frames: 50,
        trace: false,
    };

    // down(48) needs 49 frames on top of main
    let run = run_bytecode(&compile(&format!("{}down(48)\n", DOWN)), options);
    assert_eq!(run.result, Ok(()));

    let run = run_bytecode(&compile(&format!("{}down(49)\n", DOWN)), options);
    assert_eq!(run.result, Err(VmError::StackOverflow(50)));
}

#[test]
fn test_unbounded_recursion_is_an_error() {
    let source = "\
function forever(n)
    return forever(n + 1)
end
forever(0)
";
    let err = expect_runtime_error(source, "stack overflow");
    assert_eq!(err, VmError::StackOverflow(sky_engine::vm::DEFAULT_MAX_FRAMES));
}
