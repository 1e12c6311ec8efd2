//! Token definitions for the Sky programming language.
//!
//! This module defines every token the lexer can produce, including the
//! structural tokens (NEWLINE, INDENT, DEDENT) synthesized by the off-side rule.

use std::fmt;
use std::rc::Rc;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Ident,
    Int,
    Float,
    String,

    // Keywords
    Function,
    End,
    Class,
    Let,
    Const,
    If,
    Elif,
    Else,
    For,
    While,
    Return,
    Break,
    Continue,
    Async,
    Await,
    Coop,
    Yield,
    Unsafe,
    SelfKw,
    Super,
    Import,
    As,
    In,
    True,
    False,
    And,
    Or,
    Not,
    Enum,
    Match,
    Try,
    Catch,
    Finally,
    Throw,

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,

    // Comparison operators
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical operators
    AndAnd,
    OrOr,
    Bang,

    // Assignment operators
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,
    Arrow,
    Ellipsis,
    At,
    Question,
    Pipe,

    // Structural
    Newline,
    Indent,
    Dedent,
    Eof,
    Illegal,
    Comment,
}

impl TokenKind {
    /// Look up the keyword kind for an identifier, if it is reserved.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "function" => TokenKind::Function,
            "end" => TokenKind::End,
            "class" => TokenKind::Class,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "if" => TokenKind::If,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "async" => TokenKind::Async,
            "await" => TokenKind::Await,
            "coop" => TokenKind::Coop,
            "yield" => TokenKind::Yield,
            "unsafe" => TokenKind::Unsafe,
            "self" => TokenKind::SelfKw,
            "super" => TokenKind::Super,
            "import" => TokenKind::Import,
            "as" => TokenKind::As,
            "in" => TokenKind::In,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "enum" => TokenKind::Enum,
            "match" => TokenKind::Match,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            _ => return None,
        };
        Some(kind)
    }

    /// Check if this kind is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Function | End | Class | Let | Const | If | Elif | Else | For | While | Return
                | Break | Continue | Async | Await | Coop | Yield | Unsafe | SelfKw | Super
                | Import | As | In | True | False | And | Or | Not | Enum | Match | Try
                | Catch | Finally | Throw
        )
    }

    /// Check if this kind is one of the assignment operators (`=`, `+=`, ...).
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
        )
    }

    /// Check if this kind is synthesized by the lexer rather than spelled in source.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Function => "FUNCTION",
            TokenKind::End => "END",
            TokenKind::Class => "CLASS",
            TokenKind::Let => "LET",
            TokenKind::Const => "CONST",
            TokenKind::If => "IF",
            TokenKind::Elif => "ELIF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::While => "WHILE",
            TokenKind::Return => "RETURN",
            TokenKind::Break => "BREAK",
            TokenKind::Continue => "CONTINUE",
            TokenKind::Async => "ASYNC",
            TokenKind::Await => "AWAIT",
            TokenKind::Coop => "COOP",
            TokenKind::Yield => "YIELD",
            TokenKind::Unsafe => "UNSAFE",
            TokenKind::SelfKw => "SELF",
            TokenKind::Super => "SUPER",
            TokenKind::Import => "IMPORT",
            TokenKind::As => "AS",
            TokenKind::In => "IN",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Enum => "ENUM",
            TokenKind::Match => "MATCH",
            TokenKind::Try => "TRY",
            TokenKind::Catch => "CATCH",
            TokenKind::Finally => "FINALLY",
            TokenKind::Throw => "THROW",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Power => "**",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Assign => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Arrow => "=>",
            TokenKind::Ellipsis => "...",
            TokenKind::At => "@",
            TokenKind::Question => "?",
            TokenKind::Pipe => "|",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Comment => "COMMENT",
        };
        f.write_str(name)
    }
}

/// Source location information for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Merge two spans into one covering both. Line/column come from the earlier span.
    pub fn merge(&self, other: &Span) -> Span {
        let (first, _) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }
}

/// A token produced by the lexer. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text. Strings carry their unescaped contents, ILLEGAL tokens carry the error message.
    pub literal: String,
    pub span: Span,
    /// Source name the token was read from.
    pub file: Rc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span, file: Rc<str>) -> Self {
        Self {
            kind,
            literal: literal.into(),
            span,
            file,
        }
    }

    /// A token not tied to any source text. Used for synthesized AST nodes.
    pub fn synthetic(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self::new(kind, literal, Span::default(), Rc::from(""))
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn line(&self) -> u32 {
        self.span.line
    }

    pub fn column(&self) -> u32 {
        self.span.column
    }

    /// Render the token position as `file:line:col`.
    pub fn position(&self) -> String {
        format!("{}:{}:{}", self.file, self.span.line, self.span.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof => {
                write!(f, "{}", self.kind)
            }
            _ => write!(f, "{}({:?})", self.kind, self.literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("let"), Some(TokenKind::Let));
        assert_eq!(TokenKind::keyword("elif"), Some(TokenKind::Elif));
        assert_eq!(TokenKind::keyword("self"), Some(TokenKind::SelfKw));
        assert_eq!(TokenKind::keyword("letter"), None);
    }

    #[test]
    fn test_keyword_classification() {
        assert!(TokenKind::Coop.is_keyword());
        assert!(!TokenKind::Ident.is_keyword());
        assert!(TokenKind::PercentEq.is_assignment());
        assert!(!TokenKind::Eq.is_assignment());
    }

    #[test]
    fn test_position() {
        let tok = Token::new(TokenKind::Let, "let", Span::new(0, 3, 4, 2), Rc::from("main.sky"));
        assert_eq!(tok.position(), "main.sky:4:2");
        assert_eq!(tok.to_string(), "LET(\"let\")");
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 8, 1, 5);
        let b = Span::new(0, 2, 1, 1);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 8);
        assert_eq!(merged.column, 1);
    }
}
