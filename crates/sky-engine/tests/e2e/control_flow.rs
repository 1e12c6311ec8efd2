//! Conditionals, loops, break/continue and match

use super::harness::*;
use sky_engine::VmOptions;

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_if_elif_else() {
    let source = "\
function classify(n)
    if n < 0
        return \"negative\"
    elif n == 0
        return \"zero\"
    else
        return \"positive\"
    end
end
print(classify(-3))
print(classify(0))
print(classify(7))
";
    expect_output(source, "negative\nzero\npositive\n");
}

#[test]
fn test_if_without_else() {
    expect_output("let x = 1\nif x > 5\n    print(\"big\")\nend\nprint(\"done\")\n", "done\n");
}

#[test]
fn test_truthiness_of_conditions() {
    // The checker requires bool conditions; the VM itself accepts any value.
    let source = "\
if 0
    print(\"zero\")
end
if \"\"
    print(\"empty string\")
end
if nil
    print(\"nil\")
end
";
    let run = run_bytecode(&compile_unchecked(source), VmOptions::default());
    assert_eq!(run.result, Ok(()));
    assert_eq!(run.output, "empty string\n");
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_while_loop() {
    expect_int("let i = 0\nwhile i < 10\n    i += 1\nend\ni\n", 10);
}

#[test]
fn test_while_break_and_continue() {
    let source = "\
let i = 0
while true
    i += 1
    if i == 3
        continue
    end
    if i > 5
        break
    end
    print(i)
end
";
    expect_output(source, "1\n2\n4\n5\n");
}

#[test]
fn test_for_continue_runs_increment() {
    let source = "\
for i in range(6)
    if i % 2 == 0
        continue
    end
    print(i)
end
";
    expect_output(source, "1\n3\n5\n");
}

#[test]
fn test_nested_break_only_leaves_inner_loop() {
    let source = "\
for i in range(3)
    for j in range(3)
        if j == 1
            break
        end
        print(i * 10 + j)
    end
end
";
    expect_output(source, "0\n10\n20\n");
}

#[test]
fn test_for_over_empty_list() {
    expect_output("for x in []\n    print(x)\nend\nprint(\"after\")\n", "after\n");
}

// ============================================================================
// Match
// ============================================================================

#[test]
fn test_match_with_wildcard() {
    let source = "\
function name(n)
    return match n
        1 => \"one\"
        2 => \"two\"
        _ => \"many\"
    end
end
print(name(1))
print(name(2))
print(name(9))
";
    expect_output(source, "one\ntwo\nmany\n");
}

#[test]
fn test_match_without_arm_is_nil() {
    let source = "\
let x = 5
let y = match x
    1 => \"one\"
end
print(y)
";
    expect_output(source, "nil\n");
}
