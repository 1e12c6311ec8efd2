//! Diagnostic rendering for front-end errors
//!
//! Lex, parse and check errors are converted into `codespan-reporting`
//! diagnostics with an error code and a labelled source snippet, then
//! rendered to any `termcolor` stream or serialized as JSON.

use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use serde::{Deserialize, Serialize};
use termcolor::{NoColor, WriteColor};

use crate::parser::checker::CheckError;
use crate::parser::lexer::LexError;
use crate::parser::parser::{ParseError, ParseErrorKind};
use crate::parser::token::Span;

/// Source files diagnostics point into.
pub type SourceFiles = SimpleFiles<String, String>;

/// Error code for a diagnostic (e.g. "E1001")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// A diagnostic message with source code context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::primary(file_id, label_range(span)).with_message(message));
        self
    }

    /// Add a secondary label (related location)
    pub fn with_secondary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::secondary(file_id, label_range(span)).with_message(message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Create diagnostic from a lexical error
    pub fn from_lex_error(error: &LexError, file_id: usize) -> Self {
        let (code, label) = if error.message == "unterminated string" {
            ("E1002", "string starts here")
        } else if error.message.starts_with("indentation error") {
            ("E1003", "does not match any enclosing block")
        } else {
            ("E1001", "not valid here")
        };

        let diag = Diagnostic::error(error.message.clone())
            .with_code(ErrorCode(code))
            .with_primary_label(file_id, error.span, label);
        match error.hint() {
            Some(hint) => diag.with_help(hint),
            None => diag,
        }
    }

    /// Create diagnostic from a syntax error
    pub fn from_parse_error(error: &ParseError, file_id: usize) -> Self {
        let (code, label) = match &error.kind {
            ParseErrorKind::ExpectedToken { expected, .. } => {
                ("E1101", format!("expected {}", expected))
            }
            ParseErrorKind::NoPrefixParse { .. } => ("E1102", "expected an expression".to_string()),
            ParseErrorKind::UnexpectedToken { .. } => ("E1103", "unexpected here".to_string()),
            ParseErrorKind::InvalidNumber { .. } => ("E1104", "number out of range".to_string()),
            ParseErrorKind::DepthLimitExceeded { limit } => {
                ("E1105", format!("nested more than {} levels deep", limit))
            }
        };

        let diag = Diagnostic::error(error.message.clone())
            .with_code(ErrorCode(code))
            .with_primary_label(file_id, error.span, label);
        match error.hint() {
            Some(hint) => diag.with_help(hint),
            None => diag,
        }
    }

    /// Create diagnostic from a semantic error
    pub fn from_check_error(error: &CheckError, file_id: usize) -> Self {
        use CheckError::*;

        let label = match error {
            UndefinedVariable { .. } => "not found in this scope",
            DuplicateSymbol { .. } => "duplicate declaration",
            ConstReassignment { .. } => "cannot be reassigned",
            InvalidAssignmentTarget { .. } => "only variables can be assigned",
            TypeMismatch { .. } | ReturnTypeMismatch { .. } => "mismatched types",
            ArgumentCountMismatch { .. } => "incorrect number of arguments",
            ArgumentTypeMismatch { .. } => "argument has the wrong type",
            BreakOutsideLoop { .. } => "not inside a loop",
            ReturnOutsideFunction { .. } => "not inside a function",
            _ => "here",
        };

        let diag = Diagnostic::error(error.to_string())
            .with_code(ErrorCode(error.code()))
            .with_primary_label(file_id, error.span(), label);

        match error {
            DuplicateSymbol { original, .. } if *original != Span::default() => {
                diag.with_secondary_label(file_id, *original, "first declaration here")
            }
            AwaitOutsideAsync { .. } => diag.with_help("declare the enclosing function `async`"),
            NonBoolCondition { .. } => diag.with_help("compare the value explicitly, e.g. `x != 0`"),
            _ => diag,
        }
    }

    /// Render the diagnostic to a (possibly colored) stream.
    pub fn emit(
        &self,
        writer: &mut dyn WriteColor,
        files: &SourceFiles,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.inner)
    }

    /// Render the diagnostic without colors.
    pub fn render_plain(&self, files: &SourceFiles) -> String {
        let mut buffer = NoColor::new(Vec::new());
        if self.emit(&mut buffer, files).is_err() {
            return self.inner.message.clone();
        }
        String::from_utf8_lossy(&buffer.into_inner()).into_owned()
    }

    /// Convert to JSON representation for editor integration
    pub fn to_json(&self, files: &SourceFiles) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self, files))
    }
}

/// Codespan needs a non-empty range to draw a caret.
fn label_range(span: Span) -> Range<usize> {
    if span.is_empty() {
        span.start..span.start + 1
    } else {
        span.start..span.end
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// 1-indexed
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    /// "primary" or "secondary"
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SourceFiles) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                // Clamp so zero-width spans at EOF still resolve.
                let end = label.range.end.min(file.source().len());
                let start = label.range.start.min(end);
                let start_location = files.location(label.file_id, start).ok()?;
                let end_location = files.location(label.file_id, end).ok()?;

                Some(JsonLabel {
                    file: file.name().clone(),
                    start_line: start_location.line_number,
                    start_column: start_location.column_number,
                    end_line: end_location.line_number,
                    end_column: end_location.column_number,
                    message: label.message.clone(),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Create a file database holding a single source file; its id is 0.
pub fn create_files(name: impl Into<String>, source: impl Into<String>) -> SourceFiles {
    let mut files = SimpleFiles::new();
    files.add(name.into(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::checker::check_program;
    use crate::parser::{Lexer, Parser};

    #[test]
    fn test_diagnostic_with_code() {
        let diag = Diagnostic::error("Test error").with_code(ErrorCode("E2001"));
        assert_eq!(diag.code(), Some(ErrorCode("E2001")));
        assert_eq!(diag.inner().severity, Severity::Error);
    }

    #[test]
    fn test_lex_error_diagnostic() {
        let source = "let s = \"open\n";
        let tokens = Lexer::new(source, "t.sky").tokenize();
        let errors = LexError::from_tokens(&tokens);
        let diag = Diagnostic::from_lex_error(&errors[0], 0);
        assert_eq!(diag.code(), Some(ErrorCode("E1002")));

        let files = create_files("t.sky", source);
        let rendered = diag.render_plain(&files);
        assert!(rendered.contains("unterminated string"));
        assert!(rendered.contains("t.sky:1:"));
    }

    #[test]
    fn test_parse_error_diagnostic() {
        let source = "let = 5\n";
        let (_, errors) = Parser::new(source, "t.sky").parse();
        let diag = Diagnostic::from_parse_error(&errors[0], 0);
        assert_eq!(diag.code(), Some(ErrorCode("E1101")));
        assert!(diag.message().starts_with("expected next token to be IDENT"));
    }

    #[test]
    fn test_check_error_json() {
        let source = "let x: int = \"hello\"\n";
        let (program, parse_errors) = Parser::new(source, "t.sky").parse();
        assert!(parse_errors.is_empty());
        let errors = check_program(&program);
        let diag = Diagnostic::from_check_error(&errors[0], 0);
        let files = create_files("t.sky", source);

        let json = diag.to_json(&files).unwrap();
        assert!(json.contains("\"E2005\""));
        assert!(json.contains("\"start_line\": 1"));
        assert!(json.contains("\"primary\""));
    }
}
