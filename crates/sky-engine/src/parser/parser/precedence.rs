//! Operator precedence table for expression parsing.

use crate::parser::token::TokenKind;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest = 0,
    Assign = 1,      // =, +=, -=, *=, /=, %=
    Or = 2,          // ||, or
    And = 3,         // &&, and
    Equals = 4,      // ==, !=
    LessGreater = 5, // <, >, <=, >=
    Sum = 6,         // +, -
    Product = 7,     // *, /, %
    Power = 8,       // **
    Prefix = 9,      // -x, !x, not x
    Call = 10,       // f(x)
    Index = 11,      // xs[i], obj.member
}

impl Precedence {
    /// The level just below this one. Parsing the right operand of a
    /// right-associative operator at this level lets it bind again.
    pub fn lower(self) -> Precedence {
        use Precedence::*;
        match self {
            Lowest | Assign => Lowest,
            Or => Assign,
            And => Or,
            Equals => And,
            LessGreater => Equals,
            Sum => LessGreater,
            Product => Sum,
            Power => Product,
            Prefix => Power,
            Call => Prefix,
            Index => Call,
        }
    }
}

/// Precedence of a token in infix position. Tokens that cannot continue an
/// expression report `Lowest`, which stops the Pratt loop.
pub fn infix_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Assign
        | TokenKind::PlusEq
        | TokenKind::MinusEq
        | TokenKind::StarEq
        | TokenKind::SlashEq
        | TokenKind::PercentEq => Precedence::Assign,

        TokenKind::OrOr | TokenKind::Or => Precedence::Or,
        TokenKind::AndAnd | TokenKind::And => Precedence::And,

        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,

        TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => {
            Precedence::LessGreater
        }

        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Product,

        // Exponentiation (right-associative)
        TokenKind::Power => Precedence::Power,

        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket | TokenKind::Dot => Precedence::Index,

        _ => Precedence::Lowest,
    }
}

/// Check if an operator is right-associative.
pub fn is_right_associative(kind: TokenKind) -> bool {
    kind == TokenKind::Power || kind.is_assignment()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Precedence::Assign < Precedence::Or);
        assert!(Precedence::Sum < Precedence::Product);
        assert!(Precedence::Power < Precedence::Prefix);
        assert!(Precedence::Call < Precedence::Index);
    }

    #[test]
    fn test_keyword_operators_share_levels() {
        assert_eq!(infix_precedence(TokenKind::And), infix_precedence(TokenKind::AndAnd));
        assert_eq!(infix_precedence(TokenKind::Or), infix_precedence(TokenKind::OrOr));
        assert_eq!(infix_precedence(TokenKind::Newline), Precedence::Lowest);
    }

    #[test]
    fn test_right_associative() {
        assert!(is_right_associative(TokenKind::Power));
        assert!(is_right_associative(TokenKind::PlusEq));
        assert!(!is_right_associative(TokenKind::Minus));
        assert_eq!(Precedence::Power.lower(), Precedence::Product);
    }
}
