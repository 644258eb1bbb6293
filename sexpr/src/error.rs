//! Positioned syntax errors.
use std::fmt::Write as _;

use crate::source::Position;

/// The reason a parse was aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("unmatched '('")]
    UnmatchedOpen,
    #[error("unmatched ')'")]
    UnmatchedClose,
    #[error("EOF in string literal")]
    EofInString,
    #[error("EOF in backslash sequence in string literal")]
    EofInStringEscape,
    #[error("EOF in backslash sequence in token")]
    EofInTokenEscape,
    #[error("character following backslash: {0:?}")]
    UnexpectedEscape(char),
    #[error("nonhex digit: {0:?}")]
    NonHexDigit(char),
    #[error("octal escape out of range")]
    OctalOutOfRange,
    #[error("integer literal outside the 128-bit range")]
    IntOutOfRange,
    #[error("tab (try the 'expand' program)")]
    Tab,
    #[error("carriage return (try the 'dos2unix' program)")]
    CarriageReturn,
    #[error("C0 control character {0:#04x}")]
    ControlCharacter(u8),
    #[error("I/O error: {0}")]
    Io(String),
}

/// A parse error, located at the character that caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{position}: unexpected {kind}")]
pub struct ParseError {
    kind: ErrorKind,
    position: Position,
}

impl ParseError {
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        ParseError { kind, position }
    }

    pub(crate) fn io(err: &std::io::Error, position: Position) -> Self {
        ParseError::new(ErrorKind::Io(err.to_string()), position)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Renders the error the way a compiler would, with the offending line
    /// and a caret under the column:
    ///
    /// ```text
    /// At input.sexp:3:7
    /// Unexpected unmatched ')'
    /// (a b))
    ///      ^
    /// ```
    pub fn report(&self) -> String {
        let position = &self.position;
        let mut out = String::new();
        let _ = writeln!(out, "At {position}");
        let _ = writeln!(out, "Unexpected {}", self.kind);

        let text = position.line_text();
        if !text.is_empty() {
            out.push_str(&text);
            if !text.ends_with('\n') {
                out.push('\n');
            }
            out.extend(std::iter::repeat(' ').take(position.column.saturating_sub(1)));
            out.push('^');
        }

        out
    }
}

/// Shorthand for a result specialised to parse errors.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[cfg(test)]
mod test {
    use super::{ErrorKind, ParseError};
    use crate::source::Position;

    fn position(line: &str, column: usize) -> Position {
        Position {
            filename: "input.sexp".into(),
            line: 3,
            column,
            text: line.as_bytes().into(),
        }
    }

    #[test]
    fn display_is_single_line() {
        let err = ParseError::new(ErrorKind::UnmatchedClose, position("(a b))\n", 6));
        assert_eq!(err.to_string(), "input.sexp:3:6: unexpected unmatched ')'");
    }

    #[test]
    fn int_out_of_range_names_the_limit() {
        let err = ParseError::new(ErrorKind::IntOutOfRange, position("0xfff\n", 1));
        assert_eq!(
            err.to_string(),
            "input.sexp:3:1: unexpected integer literal outside the 128-bit range"
        );
    }

    #[test]
    fn report_points_at_column() {
        let err = ParseError::new(ErrorKind::UnmatchedClose, position("(a b))\n", 6));
        assert_eq!(
            err.report(),
            "At input.sexp:3:6\nUnexpected unmatched ')'\n(a b))\n     ^"
        );
    }

    #[test]
    fn report_without_line_text() {
        let err = ParseError::new(ErrorKind::EofInString, position("", 1));
        assert_eq!(err.report(), "At input.sexp:3:1\nUnexpected EOF in string literal\n");
    }
}
