//! Checker integration tests

use sky_engine::{check_program, CheckError, Parser};

fn check(source: &str) -> Vec<CheckError> {
    let (program, errors) = Parser::new(source, "test.sky").parse();
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    check_program(&program)
}

fn messages(source: &str) -> Vec<String> {
    check(source).iter().map(|e| e.to_string()).collect()
}

#[test]
fn test_clean_program() {
    let source = r#"
function fib(n: int): int
    if n < 2
        return n
    end
    return fib(n - 1) + fib(n - 2)
end

let total = 0
for i in range(10)
    total += fib(i)
end
print("total", total)
"#;
    assert_eq!(check(source), vec![]);
}

#[test]
fn test_type_mismatch_reported_once() {
    assert_eq!(
        messages("let x: int = \"hello\"\n"),
        vec!["type mismatch: cannot assign string to int"]
    );
}

#[test]
fn test_const_reassignment() {
    assert_eq!(
        messages("const PI = 3.14\nPI = 3.15\n"),
        vec!["cannot assign to const variable 'PI'"]
    );
}

#[test]
fn test_errors_accumulate_in_source_order() {
    let errors = check("let a: int = \"x\"\nprint(nope)\nreturn 1\n");
    let codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
    assert_eq!(codes, ["E2005", "E2001", "E2006"]);
    assert_eq!(errors[1].render("test.sky"), "test.sky:2:7: undefined: nope");
}

#[test]
fn test_builtin_arity() {
    assert_eq!(
        messages("len(1, 2)\n"),
        vec!["wrong number of arguments: expected 1, got 2"]
    );
}
