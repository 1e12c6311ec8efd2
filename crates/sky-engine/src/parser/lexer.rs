//! Lexer for the Sky programming language.
//!
//! Scanning of identifiers, numbers and operators is delegated to a logos
//! generated DFA. Everything that depends on line structure is handled by hand
//! around it: the off-side rule (INDENT/DEDENT), significant newlines, comments
//! and string literals.
//!
//! The lexer never fails. Problems are reported as [`TokenKind::Illegal`] tokens
//! whose literal is the error message; [`LexError::from_tokens`] collects them.

use std::collections::VecDeque;
use std::rc::Rc;

use logos::Logos;
use thiserror::Error;

use crate::parser::token::{Span, Token, TokenKind};

/// Columns a tab counts for when measuring indentation.
pub const TAB_WIDTH: usize = 4;

/// Logos-based token enum for lexing.
///
/// Only used for single-token scans; converted to [`TokenKind`] right away.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"0[xX][0-9a-fA-F]+")]
    #[regex(r"0[bB][01]+")]
    #[regex(r"0[oO][0-7]+")]
    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,

    // Multi-character operators
    #[token("**")]
    Power,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("=>")]
    Arrow,
    #[token("...")]
    Ellipsis,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("=")]
    Assign,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("@")]
    At,
    #[token("?")]
    Question,
    #[token("|")]
    Pipe,
}

impl LogosToken {
    fn kind(self) -> TokenKind {
        match self {
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::Int => TokenKind::Int,
            LogosToken::Float => TokenKind::Float,
            LogosToken::Power => TokenKind::Power,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::NotEq => TokenKind::NotEq,
            LogosToken::LtEq => TokenKind::LtEq,
            LogosToken::GtEq => TokenKind::GtEq,
            LogosToken::AndAnd => TokenKind::AndAnd,
            LogosToken::OrOr => TokenKind::OrOr,
            LogosToken::PlusEq => TokenKind::PlusEq,
            LogosToken::MinusEq => TokenKind::MinusEq,
            LogosToken::StarEq => TokenKind::StarEq,
            LogosToken::SlashEq => TokenKind::SlashEq,
            LogosToken::PercentEq => TokenKind::PercentEq,
            LogosToken::Arrow => TokenKind::Arrow,
            LogosToken::Ellipsis => TokenKind::Ellipsis,
            LogosToken::Plus => TokenKind::Plus,
            LogosToken::Minus => TokenKind::Minus,
            LogosToken::Star => TokenKind::Star,
            LogosToken::Slash => TokenKind::Slash,
            LogosToken::Percent => TokenKind::Percent,
            LogosToken::Lt => TokenKind::Lt,
            LogosToken::Gt => TokenKind::Gt,
            LogosToken::Bang => TokenKind::Bang,
            LogosToken::Assign => TokenKind::Assign,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::Dot => TokenKind::Dot,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::At => TokenKind::At,
            LogosToken::Question => TokenKind::Question,
            LogosToken::Pipe => TokenKind::Pipe,
        }
    }
}

/// Parse the text of an INT token (`42`, `0xFF`, `0b1010`, `0o17`).
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let bytes = text.as_bytes();
    if bytes.len() > 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return i64::from_str_radix(&text[2..], 16).ok(),
            b'b' | b'B' => return i64::from_str_radix(&text[2..], 2).ok(),
            b'o' | b'O' => return i64::from_str_radix(&text[2..], 8).ok(),
            _ => {}
        }
    }
    text.parse().ok()
}

/// Parse the text of a FLOAT token. Literals that overflow to infinity
/// are rejected.
pub fn parse_float_literal(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('0') => result.push('\0'),
            // Unknown escapes keep the escaped character
            Some(other) => result.push(other),
            None => {}
        }
    }

    result
}

/// Off-side rule lexer producing Sky tokens one at a time.
pub struct Lexer<'a> {
    source: &'a str,
    file: Rc<str>,
    pos: usize,
    line: u32,
    column: u32,
    /// Indentation levels of the open blocks; the bottom entry is always 0.
    indent_stack: Vec<usize>,
    /// Tokens already decided but not yet handed out (extra DEDENTs, EOF).
    pending: VecDeque<Token>,
    paren_depth: usize,
    at_line_start: bool,
    last_kind: Option<TokenKind>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: impl Into<Rc<str>>) -> Self {
        Self {
            source,
            file: file.into(),
            pos: 0,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            pending: VecDeque::new(),
            paren_depth: 0,
            at_line_start: true,
            last_kind: None,
            finished: false,
        }
    }

    /// Source name used in token positions.
    pub fn file(&self) -> &Rc<str> {
        &self.file
    }

    /// Pump [`Lexer::next_token`] until EOF, returning every token including the EOF.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Produce the next token. After EOF every further call yields EOF again.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        self.last_kind = Some(token.kind);
        token
    }

    fn scan(&mut self) -> Token {
        if let Some(token) = self.pending.pop_front() {
            return token;
        }
        if self.finished {
            return self.make(TokenKind::Eof, "", self.pos, self.pos);
        }

        if self.at_line_start && self.paren_depth == 0 {
            self.at_line_start = false;
            if let Some(token) = self.handle_indentation() {
                return token;
            }
        }

        self.skip_whitespace();

        let Some(ch) = self.peek_char() else {
            return self.end_of_input();
        };

        match ch {
            '\n' => {
                let token = self.make(TokenKind::Newline, "\\n", self.pos, self.pos + 1);
                self.pos += 1;
                self.line += 1;
                self.column = 1;
                self.at_line_start = true;
                token
            }
            '#' => self.scan_comment(),
            '"' | '\'' => self.scan_string(ch),
            _ => self.scan_logos(),
        }
    }

    /// Measure the indentation of a fresh logical line and compare it with the
    /// indent stack. Blank and comment-only lines leave the stack untouched.
    fn handle_indentation(&mut self) -> Option<Token> {
        let start = self.pos;
        let mut level = 0usize;
        while let Some(ch) = self.peek_char() {
            match ch {
                ' ' => level += 1,
                '\t' => level += TAB_WIDTH,
                _ => break,
            }
            self.pos += 1;
            self.column += 1;
        }

        match self.peek_char() {
            None | Some('\n') | Some('#') => return None,
            Some('\r') if self.source[self.pos..].starts_with("\r\n") => return None,
            _ => {}
        }

        let current = self.current_indent();
        if level > current {
            self.indent_stack.push(level);
            return Some(self.make_at(TokenKind::Indent, "", start, self.pos, 1));
        }
        if level == current {
            return None;
        }

        let mut dedents = 0usize;
        while self.indent_stack.len() > 1 && self.current_indent() > level {
            self.indent_stack.pop();
            dedents += 1;
        }

        if self.current_indent() != level {
            let message = format!("indentation error at line {}", self.line);
            let error = self.make_at(TokenKind::Illegal, message, start, self.pos, 1);
            for _ in 0..dedents {
                let dedent = self.make_at(TokenKind::Dedent, "", start, self.pos, 1);
                self.pending.push_back(dedent);
            }
            return Some(error);
        }

        for _ in 1..dedents {
            let dedent = self.make_at(TokenKind::Dedent, "", start, self.pos, 1);
            self.pending.push_back(dedent);
        }
        Some(self.make_at(TokenKind::Dedent, "", start, self.pos, 1))
    }

    /// Close the final logical line, then every open block, then emit EOF.
    fn end_of_input(&mut self) -> Token {
        let end = self.source.len();

        let line_open = matches!(
            self.last_kind,
            Some(kind) if !matches!(kind, TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent)
        );
        if line_open {
            self.at_line_start = true;
            return self.make(TokenKind::Newline, "\\n", end, end);
        }

        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            let dedent = self.make(TokenKind::Dedent, "", end, end);
            self.pending.push_back(dedent);
        }
        let eof = self.make(TokenKind::Eof, "", end, end);
        self.pending.push_back(eof);
        self.finished = true;

        self.pending
            .pop_front()
            .unwrap_or_else(|| self.make(TokenKind::Eof, "", end, end))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.pos += 1;
                    self.column += 1;
                }
                // Inside brackets newlines are plain whitespace
                '\n' if self.paren_depth > 0 => {
                    self.pos += 1;
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
        }
    }

    fn scan_comment(&mut self) -> Token {
        let start = self.pos;
        let end = self.source[start..]
            .find('\n')
            .map(|offset| start + offset)
            .unwrap_or(self.source.len());
        let text = self.source[start..end].trim_end_matches('\r');
        let token = self.make(TokenKind::Comment, text, start, end);
        self.advance_to(end);
        token
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.pos;
        let body_start = start + quote.len_utf8();
        let mut chars = self.source[body_start..].char_indices();
        let mut close = None;

        while let Some((offset, ch)) = chars.next() {
            match ch {
                '\n' => break,
                '\\' => match chars.next() {
                    Some((_, '\n')) | None => break,
                    Some(_) => {}
                },
                c if c == quote => {
                    close = Some(body_start + offset);
                    break;
                }
                _ => {}
            }
        }

        match close {
            Some(close) => {
                let value = unescape_string(&self.source[body_start..close]);
                let end = close + quote.len_utf8();
                let token = self.make(TokenKind::String, value, start, end);
                self.advance_to(end);
                token
            }
            None => {
                let end = self.source[start..]
                    .find('\n')
                    .map(|offset| start + offset)
                    .unwrap_or(self.source.len());
                let token = self.make(TokenKind::Illegal, "unterminated string", start, end);
                self.advance_to(end);
                token
            }
        }
    }

    fn scan_logos(&mut self) -> Token {
        let start = self.pos;
        let mut logos_lexer = LogosToken::lexer(&self.source[start..]);

        match logos_lexer.next() {
            Some(Ok(logos_token)) => {
                let end = start + logos_lexer.span().end;
                let text = &self.source[start..end];
                let kind = match logos_token {
                    LogosToken::Ident => TokenKind::keyword(text).unwrap_or(TokenKind::Ident),
                    other => other.kind(),
                };

                match kind {
                    TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                        self.paren_depth += 1;
                    }
                    TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                        self.paren_depth = self.paren_depth.saturating_sub(1);
                    }
                    _ => {}
                }

                let token = if kind == TokenKind::Int && parse_int_literal(text).is_none() {
                    let message = format!("invalid integer literal '{}'", text);
                    self.make(TokenKind::Illegal, message, start, end)
                } else if kind == TokenKind::Float && parse_float_literal(text).is_none() {
                    let message = format!("float literal out of range '{}'", text);
                    self.make(TokenKind::Illegal, message, start, end)
                } else {
                    self.make(kind, text, start, end)
                };
                self.advance_to(end);
                token
            }
            _ => {
                let ch = self.peek_char().unwrap_or('\0');
                let end = start + ch.len_utf8();
                let message = format!("illegal character '{}'", ch);
                let token = self.make(TokenKind::Illegal, message, start, end);
                self.advance_to(end);
                token
            }
        }
    }

    fn current_indent(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Move the cursor to `end`, keeping the column in step. Never crosses a newline.
    fn advance_to(&mut self, end: usize) {
        self.column += self.source[self.pos..end].chars().count() as u32;
        self.pos = end;
    }

    fn make(&self, kind: TokenKind, literal: impl Into<String>, start: usize, end: usize) -> Token {
        self.make_at(kind, literal, start, end, self.column)
    }

    fn make_at(
        &self,
        kind: TokenKind,
        literal: impl Into<String>,
        start: usize,
        end: usize,
        column: u32,
    ) -> Token {
        Token::new(
            kind,
            literal,
            Span::new(start, end, self.line, column),
            self.file.clone(),
        )
    }
}

/// A lexical error recovered from an ILLEGAL token.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct LexError {
    pub message: String,
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

impl LexError {
    pub fn from_token(token: &Token) -> Self {
        Self {
            message: token.literal.clone(),
            file: token.file.clone(),
            line: token.span.line,
            column: token.span.column,
            span: token.span,
        }
    }

    /// Collect the errors carried by every ILLEGAL token in `tokens`.
    pub fn from_tokens(tokens: &[Token]) -> Vec<LexError> {
        tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Illegal)
            .map(LexError::from_token)
            .collect()
    }

    /// A hint for fixing this error, if there is an obvious one.
    pub fn hint(&self) -> Option<&'static str> {
        if self.message == "unterminated string" {
            Some("add a closing quote before the end of the line")
        } else if self.message.starts_with("indentation error") {
            Some("dedent to the indentation of an enclosing block")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, "test.sky")
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_parse_int_literal_radixes() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0xFF"), Some(255));
        assert_eq!(parse_int_literal("0b1010"), Some(10));
        assert_eq!(parse_int_literal("0o17"), Some(15));
        assert_eq!(parse_int_literal("99999999999999999999"), None);
    }

    #[test]
    fn test_parse_float_literal_rejects_overflow() {
        assert_eq!(parse_float_literal("2.5e3"), Some(2500.0));
        assert_eq!(parse_float_literal("1e308"), Some(1e308));
        assert_eq!(parse_float_literal("1e999"), None);
        assert_eq!(parse_float_literal("1.5e-999"), Some(0.0));
    }

    #[test]
    fn test_float_overflow_is_illegal() {
        let tokens = Lexer::new("let x = 1e999", "test.sky").tokenize();
        assert_eq!(tokens[3].kind, TokenKind::Illegal);
        let errors = LexError::from_tokens(&tokens);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "test.sky:1:9: float literal out of range '1e999'"
        );
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_string(r#"a\nb\t\"c\""#), "a\nb\t\"c\"");
        assert_eq!(unescape_string(r"\q"), "q");
        assert_eq!(unescape_string(r"nul\0"), "nul\0");
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("", "test.sky");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_trailing_newline_synthesized() {
        assert_eq!(
            kinds("x"),
            vec![TokenKind::Ident, TokenKind::Newline, TokenKind::Eof]
        );
        assert_eq!(
            kinds("x\n"),
            vec![TokenKind::Ident, TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn test_newlines_inside_brackets_are_whitespace() {
        assert_eq!(
            kinds("f(1,\n  2)\n"),
            vec![
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Int,
                TokenKind::Comma,
                TokenKind::Int,
                TokenKind::RParen,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_illegal_ampersand() {
        let tokens = Lexer::new("a & b", "test.sky").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "illegal character '&'");
        let errors = LexError::from_tokens(&tokens);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "test.sky:1:3: illegal character '&'");
    }
}
