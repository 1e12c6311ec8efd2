//! Parser guards against runaway recursion

use super::{ParseError, Parser};

/// Maximum nesting depth of statements and expressions before the parser
/// rejects the input instead of risking the host stack.
pub const MAX_PARSE_DEPTH: usize = 64;

/// Run `f` one nesting level deeper, failing once [`MAX_PARSE_DEPTH`] is exceeded.
pub fn nested<'a, T>(
    parser: &mut Parser<'a>,
    f: impl FnOnce(&mut Parser<'a>) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    parser.depth += 1;
    if parser.depth > MAX_PARSE_DEPTH {
        parser.depth -= 1;
        return Err(ParseError::depth_limit_exceeded(
            parser.current(),
            MAX_PARSE_DEPTH,
        ));
    }

    // Inner closure so `?` can be used freely while the depth is always restored
    let result = f(parser);

    parser.depth -= 1;
    result
}
