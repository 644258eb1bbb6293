//! Integer literals inside tokens.
//!
//! A token is an integer if it is exactly one of
//!
//! - `[+-]?0[xX][0-9a-fA-F]+` (hexadecimal)
//! - `[+-]?0[oO][0-7]+` or `[+-]?0[0-7]*` (octal)
//! - `[+-]?[1-9][0-9]*` (decimal)
use logos::Logos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(source = [u8])]
enum IntLiteral {
    #[regex(r"[+-]?0[xX][0-9a-fA-F]+")]
    Hex,
    #[regex(r"[+-]?0[oO][0-7]+")]
    PrefixedOctal,
    #[regex(r"[+-]?0[0-7]*")]
    Octal,
    #[regex(r"[+-]?[1-9][0-9]*")]
    Decimal,
}

/// The literal does not fit in the 128-bit working range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("integer literal outside the 128-bit range")]
pub struct IntOutOfRange;

/// Reads `token` as an integer literal.
///
/// Returns `Ok(None)` if the token is not an integer literal at all.
pub fn parse_int(token: &[u8]) -> Result<Option<i128>, IntOutOfRange> {
    let mut lexer = IntLiteral::lexer(token);
    let kind = match [lexer.next(), lexer.next()] {
        [Some(Ok(kind)), None] => kind,
        _ => return Ok(None),
    };

    let (negative, unsigned) = match token {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, token),
    };

    let (digits, radix) = match kind {
        IntLiteral::Hex => (&unsigned[2..], 16),
        IntLiteral::PrefixedOctal => (&unsigned[2..], 8),
        IntLiteral::Octal => (&unsigned[1..], 8),
        IntLiteral::Decimal => (unsigned, 10),
    };

    let magnitude = digits.iter().try_fold(0u128, |acc, &digit| {
        // The lexer only lets through digits valid in `radix`.
        let digit = char::from(digit).to_digit(radix).unwrap_or(0);
        acc.checked_mul(u128::from(radix))?
            .checked_add(u128::from(digit))
    });
    let magnitude = magnitude.ok_or(IntOutOfRange)?;

    let value = if negative {
        0i128.checked_sub_unsigned(magnitude)
    } else {
        i128::try_from(magnitude).ok()
    };
    value.map(Some).ok_or(IntOutOfRange)
}
