//! Source compilation pipeline.
//!
//! Lex → Parse → Check → Compile to bytecode.

use sky_engine::ast::Program;
use sky_engine::compiler::{Bytecode, CompileOptions, Compiler};
use sky_engine::diagnostic::{create_files, Diagnostic, SourceFiles};
use sky_engine::parser::checker::check_program;
use sky_engine::parser::{LexError, Lexer, Parser};

use crate::error::RuntimeError;
use crate::RuntimeOptions;

/// Diagnostics returned from a check-only pass (no codegen).
pub struct CheckDiagnostics {
    /// Errors of the first front-end stage that reported any
    pub diagnostics: Vec<Diagnostic>,
    /// The checked file, id 0
    pub files: SourceFiles,
}

impl CheckDiagnostics {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// All diagnostics rendered without colors.
    pub fn render_plain(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.render_plain(&self.files))
            .collect()
    }
}

/// Compile Sky source code with the checker and bytecode verifier enabled.
pub fn compile_source(source: &str, file: &str) -> Result<Bytecode, RuntimeError> {
    compile_source_with_options(source, file, &RuntimeOptions::default())
}

/// Compile Sky source code to bytecode.
///
/// The checker runs only when `options.check` is set; the compiler refuses
/// to run while it reports errors.
pub fn compile_source_with_options(
    source: &str,
    file: &str,
    options: &RuntimeOptions,
) -> Result<Bytecode, RuntimeError> {
    let program = parse_source(source, file)?;

    if options.check {
        let errors = check_program(&program);
        if !errors.is_empty() {
            return Err(RuntimeError::TypeCheck(
                errors
                    .iter()
                    .map(|e| e.render(file))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ));
        }
    }

    let compiler = Compiler::with_options(CompileOptions {
        verify: options.verify,
    });
    Ok(compiler.compile(&program)?)
}

/// Lex and parse, failing with every lexical or syntax error found.
pub fn parse_source(source: &str, file: &str) -> Result<Program, RuntimeError> {
    let lex_errors = LexError::from_tokens(&Lexer::new(source, file).tokenize());
    if !lex_errors.is_empty() {
        return Err(RuntimeError::Lex(format_errors(&lex_errors)));
    }

    let (program, errors) = Parser::new(source, file).parse();
    if !errors.is_empty() {
        return Err(RuntimeError::Parse(format_errors(&errors)));
    }
    Ok(program)
}

/// Run the front end and collect diagnostics without compiling.
pub fn check_source(source: &str, file: &str) -> CheckDiagnostics {
    let files = create_files(file, source);

    let lex_errors = LexError::from_tokens(&Lexer::new(source, file).tokenize());
    if !lex_errors.is_empty() {
        return CheckDiagnostics {
            diagnostics: lex_errors
                .iter()
                .map(|e| Diagnostic::from_lex_error(e, 0))
                .collect(),
            files,
        };
    }

    let (program, parse_errors) = Parser::new(source, file).parse();
    let diagnostics = if parse_errors.is_empty() {
        check_program(&program)
            .iter()
            .map(|e| Diagnostic::from_check_error(e, 0))
            .collect()
    } else {
        parse_errors
            .iter()
            .map(|e| Diagnostic::from_parse_error(e, 0))
            .collect()
    };
    CheckDiagnostics { diagnostics, files }
}

fn format_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

