//! Parser for the Sky language
//!
//! A Pratt parser for expressions with recursive descent for statements. It
//! pulls tokens from the [`Lexer`] on demand and keeps one token of lookahead
//! (current + peek); COMMENT tokens are skipped transparently.
//!
//! Parsing never aborts: syntax errors are accumulated and the parser
//! resynchronizes at the next statement boundary, so one run reports as many
//! errors as it can find.

pub mod error;
mod expr;
mod guards;
pub mod precedence;
mod recovery;
mod stmt;
mod types;

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::parser::ast::*;
use crate::parser::lexer::Lexer;
use crate::parser::token::{Token, TokenKind};

pub use error::{ParseError, ParseErrorKind};
pub use guards::MAX_PARSE_DEPTH;
pub use precedence::Precedence;

/// Parser state for the Sky programming language.
pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current: Token,
    peek: Token,

    /// Number of tokens consumed so far; used to detect lack of progress
    consumed: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,

    /// Names declared with `enum`, so `Name.Variant` parses as a constructor
    enum_names: FxHashSet<String>,

    /// Current nesting depth, bounded by [`MAX_PARSE_DEPTH`]
    pub(crate) depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file: impl Into<Rc<str>>) -> Self {
        let mut lexer = Lexer::new(source, file);
        let current = Self::next_significant(&mut lexer);
        let peek = Self::next_significant(&mut lexer);
        Self {
            lexer,
            current,
            peek,
            consumed: 0,
            errors: Vec::new(),
            enum_names: FxHashSet::default(),
            depth: 0,
        }
    }

    /// Parse a whole source file.
    pub fn parse(mut self) -> (Program, Vec<ParseError>) {
        let program = self.parse_program();
        (program, self.errors)
    }

    /// Parse statements until EOF. Stray NEWLINE, DEDENT and `end` tokens at
    /// the top level are skipped.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.at_eof() {
            if self.check_any(&[TokenKind::Newline, TokenKind::Dedent, TokenKind::End]) {
                self.advance();
                continue;
            }

            let before = self.consumed;
            match stmt::parse_statement(self) {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.recover(before);
                }
            }
        }

        Program::new(statements, self.lexer.file().to_string())
    }

    /// Syntax errors collected so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    fn next_significant(lexer: &mut Lexer<'a>) -> Token {
        loop {
            let token = lexer.next_token();
            if token.kind != TokenKind::Comment {
                return token;
            }
        }
    }

    /// Get the current (not yet consumed) token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Peek at the token after the current one.
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.peek
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let next = Self::next_significant(&mut self.lexer);
        let peek = std::mem::replace(&mut self.peek, next);
        self.consumed += 1;
        std::mem::replace(&mut self.current, peek)
    }

    /// Check if the current token is of the given kind.
    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Check if the current token is any of the given kinds.
    pub fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current.kind)
    }

    #[inline]
    pub fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    /// Consume the current token if it matches the expected kind.
    pub fn expect(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected_token(expected, &self.current))
        }
    }

    /// Consume the current token if it matches, reporting whether it did.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume an identifier token.
    pub fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        self.expect(TokenKind::Ident).map(Identifier::new)
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Record an error without interrupting the current construct.
    pub(crate) fn push_error(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    /// Skip to the next statement boundary, making sure at least one token was
    /// consumed since `before` so the caller's loop always advances.
    pub(crate) fn recover(&mut self, before: usize) {
        recovery::sync_to_statement_boundary(self);
        if self.consumed == before && !self.at_eof() {
            self.advance();
        }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }

    // ========================================================================
    // Enum Registry
    // ========================================================================

    pub(crate) fn declare_enum(&mut self, name: &str) {
        self.enum_names.insert(name.to_string());
    }

    pub(crate) fn is_enum(&self, name: &str) -> bool {
        self.enum_names.contains(name)
    }
}

/// Parse `source` in one call.
pub fn parse(source: &str, file: &str) -> (Program, Vec<ParseError>) {
    Parser::new(source, file).parse()
}
