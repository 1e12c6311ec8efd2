//! Parser integration tests

use sky_engine::ast::{Expression, InfixOperator, Statement};
use sky_engine::{ParseErrorKind, Parser, TokenKind};

fn parse_ok(source: &str) -> sky_engine::ast::Program {
    let (program, errors) = Parser::new(source, "test.sky").parse();
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    program
}

fn render(source: &str) -> String {
    parse_ok(source).to_string()
}

#[test]
fn test_precedence() {
    assert_eq!(render("1 + 2 * 3\n"), "(1 + (2 * 3))\n");
    assert_eq!(render("1 * 2 + 3\n"), "((1 * 2) + 3)\n");
    assert_eq!(render("-a * b\n"), "((-a) * b)\n");
}

#[test]
fn test_assignment_is_right_associative() {
    let program = parse_ok("a = b = 1\n");
    let Statement::Expression(stmt) = &program.statements[0] else {
        panic!("expected expression statement");
    };
    let Expression::Infix(outer) = &stmt.expression else {
        panic!("expected infix");
    };
    assert_eq!(outer.operator, InfixOperator::Assign);
    assert!(matches!(*outer.right, Expression::Infix(_)));
}

#[test]
fn test_function_and_call() {
    let program = parse_ok("function add(a: int, b: int): int\n    return a + b\nend\nadd(2, 3)\n");
    assert_eq!(program.len(), 2);
    assert!(program.function("add").is_some());
    assert_eq!(program.statements[1].to_string(), "add(2, 3)");
}

#[test]
fn test_for_and_while() {
    let program = parse_ok("for i in range(3)\n    print(i)\nend\nwhile false\n    break\nend\n");
    assert!(matches!(program.statements[0], Statement::For(_)));
    assert!(matches!(program.statements[1], Statement::While(_)));
}

#[test]
fn test_collections() {
    assert_eq!(render("[1, 2]\n"), "[1, 2]\n");
    assert_eq!(render("xs[0]\n"), "(xs[0])\n");
}

#[test]
fn test_error_positions() {
    let (_, errors) = Parser::new("let = 5\n", "bad.sky").parse();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        ParseErrorKind::ExpectedToken {
            expected: TokenKind::Ident,
            found: TokenKind::Assign,
        }
    );
    assert!(errors[0].to_string().starts_with("bad.sky:1:5: "));
}

#[test]
fn test_no_prefix_parse() {
    let (_, errors) = Parser::new("let x = )\n", "test.sky").parse();
    assert!(!errors.is_empty());
    assert_eq!(errors[0].message, "no prefix parse function for ) found");
}

#[test]
fn test_parsing_continues_after_errors() {
    let (program, errors) = Parser::new("let = 1\nlet ok = 2\n", "test.sky").parse();
    assert_eq!(errors.len(), 1);
    assert_eq!(program.len(), 1);
}
