//! End-to-end runtime tests over files on disk

use std::fs;
use std::path::PathBuf;

use sky_engine::vm::{CaptureBuffer, Value, VmError, VmOptions};
use sky_runtime::{
    check_source, write_bytecode_file, Manifest, Runtime, RuntimeError, RuntimeOptions,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const FIB: &str = "function fib(n: int): int\n    if n < 2\n        return n\n    end\n    return fib(n - 1) + fib(n - 2)\nend\nlet answer = fib(10)\n";

#[test]
fn test_run_source_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "fib.sky", FIB);

    let vm = Runtime::default().run_file(&path).unwrap();
    assert_eq!(vm.global("answer"), Some(&Value::Integer(55)));
}

#[test]
fn test_run_bytecode_file() {
    let dir = TempDir::new().unwrap();
    let runtime = Runtime::default();
    let source = write(&dir, "fib.sky", FIB);
    let compiled = dir.path().join("fib.skyc");
    write_bytecode_file(&compiled, &runtime.load(&source).unwrap()).unwrap();

    let vm = runtime.run_file(&compiled).unwrap();
    assert_eq!(vm.global("answer"), Some(&Value::Integer(55)));
}

#[test]
fn test_output_capture() {
    let runtime = Runtime::default();
    let bytecode = sky_runtime::compile_source("print(\"hi\", 2 ** 10)\n", "out.sky").unwrap();
    let output = CaptureBuffer::new();
    let mut vm = runtime.vm().with_output(output.clone());
    runtime.execute(&bytecode, &mut vm).unwrap();
    assert_eq!(output.contents(), "hi\n1024\n");
}

#[test]
fn test_stage_errors_are_distinguished() {
    let runtime = Runtime::default();

    let err = runtime.run_source("let s = \"open\n", "bad.sky").unwrap_err();
    assert!(matches!(err, RuntimeError::Lex(_)));
    assert!(err
        .to_string()
        .starts_with("Lexer error: bad.sky:1:9: unterminated string"));

    let err = runtime.run_source("let = 1\n", "bad.sky").unwrap_err();
    assert!(matches!(err, RuntimeError::Parse(_)));

    let err = runtime.run_source("let x: int = \"s\"\n", "bad.sky").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Type error: bad.sky:1:1: type mismatch: cannot assign string to int"
    );

    let err = runtime.run_source("print(1 / 0)\n", "bad.sky").unwrap_err();
    assert!(err.is_runtime());
    assert!(matches!(err, RuntimeError::Vm(VmError::DivisionByZero)));
}

#[test]
fn test_overflowing_float_never_reaches_bytecode() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "huge.sky", "let x = 1e999\n");

    let err = Runtime::default().load(&path).unwrap_err();
    assert!(matches!(err, RuntimeError::Lex(_)));
    assert!(err.to_string().contains("float literal out of range '1e999'"));

    let bytecode = sky_runtime::compile_source("let x = 2.5e10\n", "big.sky").unwrap();
    let compiled = dir.path().join("big.skyc");
    write_bytecode_file(&compiled, &bytecode).unwrap();
    let vm = Runtime::default().run_file(&compiled).unwrap();
    assert_eq!(vm.global("x"), Some(&Value::Float(2.5e10)));
}

#[test]
fn test_checker_can_be_disabled() {
    // Checked, the string-to-int annotation is rejected; unchecked it runs.
    let source = "let x: int = \"s\"\n";
    let runtime = Runtime::new(RuntimeOptions {
        check: false,
        ..RuntimeOptions::default()
    });
    let vm = runtime.run_source(source, "loose.sky").unwrap();
    assert_eq!(vm.global("x"), Some(&Value::string("s")));
}

#[test]
fn test_manifest_configures_runtime() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "sky.toml",
        "[project]\nentry = \"main.sky\"\n\n[vm]\nmax-frames = 8\n",
    );
    write(
        &dir,
        "main.sky",
        "function down(n)\n    if n == 0\n        return 0\n    end\n    return down(n - 1)\nend\ndown(20)\n",
    );

    let manifest = Manifest::find(dir.path()).unwrap().unwrap();
    let options = RuntimeOptions::from_manifest(&manifest);
    assert_eq!(
        options.vm,
        VmOptions {
            max_frames: 8,
            trace: false
        }
    );

    let entry = manifest.entry_path(dir.path()).unwrap();
    let err = Runtime::new(options).run_file(&entry).unwrap_err();
    assert!(matches!(err, RuntimeError::Vm(VmError::StackOverflow(8))));
}

#[test]
fn test_check_source_diagnostics() {
    let report = check_source("let a = 1\nprint(b)\n", "diag.sky");
    assert!(!report.is_ok());
    assert_eq!(report.diagnostics.len(), 1);
    let text = report.render_plain();
    assert!(text.contains("undefined: b"));
    assert!(text.contains("diag.sky:2:7"));

    assert!(check_source("print(1)\n", "ok.sky").is_ok());
}

#[test]
fn test_missing_file() {
    let err = Runtime::default()
        .run_file(std::path::Path::new("/nonexistent/prog.sky"))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Io(_)));
}
