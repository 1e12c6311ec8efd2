//! Error recovery for the parser.
//!
//! After a syntax error the parser skips ahead to a point where statement
//! parsing can resume, so later errors in the same file are still reported.

use super::Parser;
use crate::parser::token::TokenKind;

/// Tokens that close the enclosing block. Recovery stops in front of them so
/// the block parser can finish normally.
const BLOCK_CLOSERS: &[TokenKind] = &[
    TokenKind::Dedent,
    TokenKind::End,
    TokenKind::Elif,
    TokenKind::Else,
    TokenKind::Catch,
    TokenKind::Finally,
];

/// Synchronize to the next statement boundary.
///
/// Skips to the end of the current line and consumes the NEWLINE, or stops
/// in front of a block closer or EOF.
pub fn sync_to_statement_boundary(parser: &mut Parser<'_>) {
    while !parser.at_eof() {
        if parser.check(TokenKind::Newline) {
            parser.advance();
            return;
        }
        if parser.check_any(BLOCK_CLOSERS) {
            return;
        }
        parser.advance();
    }
}
