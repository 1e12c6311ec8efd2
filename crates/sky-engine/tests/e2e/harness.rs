//! Shared helpers for the end-to-end tests

#![allow(dead_code)]

use sky_engine::compiler::{CompileOptions, Compiler};
use sky_engine::{check_program, Bytecode, CaptureBuffer, Parser, Value, Vm, VmError, VmOptions};

/// Outcome of one program run
pub struct Run {
    pub result: Result<(), VmError>,
    pub output: String,
    /// Value of the last expression statement
    pub last: Value,
}

/// Parse, check and compile `source`, panicking on any front-end error.
pub fn compile(source: &str) -> Bytecode {
    let (program, errors) = Parser::new(source, "test.sky").parse();
    assert!(errors.is_empty(), "parse errors: {:?}", errors);

    let check_errors = check_program(&program);
    assert!(
        check_errors.is_empty(),
        "check errors: {:?}",
        check_errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
    );

    compile_program(&program, true)
}

/// Parse and compile `source` without running the checker or the verifier.
pub fn compile_unchecked(source: &str) -> Bytecode {
    let (program, errors) = Parser::new(source, "test.sky").parse();
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    compile_program(&program, false)
}

fn compile_program(program: &sky_engine::ast::Program, verify: bool) -> Bytecode {
    Compiler::with_options(CompileOptions { verify })
        .compile(program)
        .unwrap_or_else(|e| panic!("compile error: {}", e))
}

pub fn run_bytecode(bytecode: &Bytecode, options: VmOptions) -> Run {
    let output = CaptureBuffer::new();
    let mut vm = Vm::new(options).with_output(output.clone());
    let result = vm.run(bytecode);
    Run {
        result,
        output: output.contents(),
        last: vm.last_popped().clone(),
    }
}

/// Check, compile and run `source` with default VM options.
pub fn run_source(source: &str) -> Run {
    run_bytecode(&compile(source), VmOptions::default())
}

/// Assert that the program's last expression statement produced `expected`.
pub fn expect_int(source: &str, expected: i64) {
    let run = run_source(source);
    if let Err(e) = &run.result {
        panic!("runtime error: {}", e);
    }
    assert_eq!(run.last, Value::Integer(expected), "source:\n{}", source);
}

/// Assert the last expression statement's value.
pub fn expect_value(source: &str, expected: Value) {
    let run = run_source(source);
    if let Err(e) = &run.result {
        panic!("runtime error: {}", e);
    }
    assert_eq!(run.last, expected, "source:\n{}", source);
}

/// Assert everything `print` wrote.
pub fn expect_output(source: &str, expected: &str) {
    let run = run_source(source);
    if let Err(e) = &run.result {
        panic!("runtime error: {}", e);
    }
    assert_eq!(run.output, expected, "source:\n{}", source);
}

/// Assert the run fails with an error whose message contains `fragment`.
/// The checker is skipped so that programs it would reject still reach the VM.
pub fn expect_runtime_error(source: &str, fragment: &str) -> VmError {
    let run = run_bytecode(&compile_unchecked(source), VmOptions::default());
    match run.result {
        Ok(()) => panic!("expected runtime error containing {:?}", fragment),
        Err(e) => {
            assert!(
                e.to_string().contains(fragment),
                "expected {:?} in {:?}",
                fragment,
                e.to_string()
            );
            e
        }
    }
}
