//! Error types for semantic checking
//!
//! Every error carries the span of the token it was reported at. Messages
//! are the canonical one-line texts; [`CheckError::render`] prefixes them
//! with `file:line:col`.

use thiserror::Error;

use crate::parser::token::Span;

/// Errors that can occur during semantic checking
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckError {
    /// Identifier not found in any enclosing scope
    #[error("undefined: {name}")]
    UndefinedVariable { name: String, span: Span },

    /// Name already bound in the same scope
    #[error("symbol '{name}' already defined in this scope")]
    DuplicateSymbol {
        name: String,
        /// Location of original definition
        original: Span,
        span: Span,
    },

    /// Assignment to a const, function, class or loop variable
    #[error("cannot assign to const variable '{name}'")]
    ConstReassignment { name: String, span: Span },

    /// Left side of `=` is not an identifier
    #[error("invalid assignment target: {target}")]
    InvalidAssignmentTarget { target: String, span: Span },

    /// Declared type incompatible with the value
    #[error("type mismatch: cannot assign {actual} to {expected}")]
    TypeMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("return statement outside of function")]
    ReturnOutsideFunction { span: Span },

    #[error("return type mismatch: expected {expected}, got {actual}")]
    ReturnTypeMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    /// `if`/`elif`/`while` condition is not bool
    #[error("{construct} condition must be bool, got {actual}")]
    NonBoolCondition {
        construct: &'static str,
        actual: String,
        span: Span,
    },

    /// `expected` is rendered as `N`, `at least N` or `N-M`
    #[error("wrong number of arguments: expected {expected}, got {actual}")]
    ArgumentCountMismatch {
        expected: String,
        actual: usize,
        span: Span,
    },

    /// `index` is 1-based
    #[error("argument {index} type mismatch: expected {expected}, got {actual}")]
    ArgumentTypeMismatch {
        index: usize,
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("{ty} is not callable")]
    NotCallable { ty: String, span: Span },

    #[error("await can only be used in async functions")]
    AwaitOutsideAsync { span: Span },

    #[error("yield can only be used in coop functions")]
    YieldOutsideFunction { span: Span },

    #[error("{keyword} can only be used inside a loop")]
    BreakOutsideLoop { keyword: &'static str, span: Span },

    #[error("operator {op} cannot be applied to {ty}")]
    InvalidUnaryOp {
        op: &'static str,
        ty: String,
        span: Span,
    },

    #[error("list index must be int, got {actual}")]
    InvalidListIndex { actual: String, span: Span },

    #[error("dict key type mismatch: expected {expected}, got {actual}")]
    DictKeyMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("list element type mismatch: expected {expected}, got {actual}")]
    ListElementMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("dict value type mismatch: expected {expected}, got {actual}")]
    DictValueMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("cannot iterate over {ty}")]
    NotIterable { ty: String, span: Span },

    #[error("{name} is not a class")]
    NotAClass { name: String, span: Span },

    #[error("undefined superclass: {name}")]
    UndefinedSuperclass { name: String, span: Span },

    #[error("class {name} cannot inherit from itself")]
    CyclicInheritance { name: String, span: Span },

    #[error("{ty} has no member '{member}'")]
    UndefinedMember {
        ty: String,
        member: String,
        span: Span,
    },
}

impl CheckError {
    /// Get the span where this error occurred
    pub fn span(&self) -> Span {
        match self {
            CheckError::UndefinedVariable { span, .. } => *span,
            CheckError::DuplicateSymbol { span, .. } => *span,
            CheckError::ConstReassignment { span, .. } => *span,
            CheckError::InvalidAssignmentTarget { span, .. } => *span,
            CheckError::TypeMismatch { span, .. } => *span,
            CheckError::ReturnOutsideFunction { span } => *span,
            CheckError::ReturnTypeMismatch { span, .. } => *span,
            CheckError::NonBoolCondition { span, .. } => *span,
            CheckError::ArgumentCountMismatch { span, .. } => *span,
            CheckError::ArgumentTypeMismatch { span, .. } => *span,
            CheckError::NotCallable { span, .. } => *span,
            CheckError::AwaitOutsideAsync { span } => *span,
            CheckError::YieldOutsideFunction { span } => *span,
            CheckError::BreakOutsideLoop { span, .. } => *span,
            CheckError::InvalidUnaryOp { span, .. } => *span,
            CheckError::InvalidListIndex { span, .. } => *span,
            CheckError::DictKeyMismatch { span, .. } => *span,
            CheckError::ListElementMismatch { span, .. } => *span,
            CheckError::DictValueMismatch { span, .. } => *span,
            CheckError::NotIterable { span, .. } => *span,
            CheckError::NotAClass { span, .. } => *span,
            CheckError::UndefinedSuperclass { span, .. } => *span,
            CheckError::CyclicInheritance { span, .. } => *span,
            CheckError::UndefinedMember { span, .. } => *span,
        }
    }

    /// Stable error code used by the diagnostic renderer.
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::UndefinedVariable { .. } => "E2001",
            CheckError::DuplicateSymbol { .. } => "E2002",
            CheckError::ConstReassignment { .. } => "E2003",
            CheckError::InvalidAssignmentTarget { .. } => "E2004",
            CheckError::TypeMismatch { .. } => "E2005",
            CheckError::ReturnOutsideFunction { .. } => "E2006",
            CheckError::ReturnTypeMismatch { .. } => "E2007",
            CheckError::NonBoolCondition { .. } => "E2008",
            CheckError::ArgumentCountMismatch { .. } => "E2009",
            CheckError::ArgumentTypeMismatch { .. } => "E2010",
            CheckError::NotCallable { .. } => "E2011",
            CheckError::AwaitOutsideAsync { .. } => "E2012",
            CheckError::YieldOutsideFunction { .. } => "E2013",
            CheckError::BreakOutsideLoop { .. } => "E2014",
            CheckError::InvalidUnaryOp { .. } => "E2015",
            CheckError::InvalidListIndex { .. } => "E2016",
            CheckError::DictKeyMismatch { .. } => "E2017",
            CheckError::ListElementMismatch { .. } => "E2018",
            CheckError::DictValueMismatch { .. } => "E2019",
            CheckError::NotIterable { .. } => "E2020",
            CheckError::NotAClass { .. } => "E2021",
            CheckError::UndefinedSuperclass { .. } => "E2022",
            CheckError::CyclicInheritance { .. } => "E2023",
            CheckError::UndefinedMember { .. } => "E2024",
        }
    }

    /// Render as `file:line:col: message`.
    pub fn render(&self, file: &str) -> String {
        let span = self.span();
        format!("{}:{}:{}: {}", file, span.line, span.column, self)
    }
}
