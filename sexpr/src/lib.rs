//! S-expressions with exact source positions.
//!
//! # Syntax
//!
//! - **Lists** are sequences of values, delimited on the outside by `(` and `)`
//!   and separated by spaces or newlines.
//!
//! - **Strings** are enclosed in double quotes.
//!
//! - **Tokens** are bare runs of bytes, ending at whitespace or at `(`, `)` or `"`.
//!   A token that reads as an integer literal (`42`, `-7`, `0x2A`, `0o52`, `017`)
//!   becomes an integer.
//!
//! Strings and tokens share one set of backslash escapes:
//!
//!    - `\ `, `\"`, `\'`, `\\` and a backslash before a newline stand for
//!      the character itself.
//!    - `\n`, `\r`, `\t`, `\a`, `\b`, `\e`, `\v` and `\f` stand for the usual
//!      control characters.
//!    - `\xHH` is a byte given by exactly two hex digits.
//!    - `\OOO` is a byte given by one to three octal digits.
//!
//! Values are bytes, not text. Tabs, carriage returns and other raw control
//! characters are rejected in the input, and a first line starting with `#!`
//! is skipped.
//!
//! Errors carry the file name, line, column and text of the offending line;
//! see [`ParseError::report`].

pub mod error;
pub(crate) mod escape;
pub mod lexer;
pub mod number;
pub mod options;
pub mod parser;
pub mod printer;
pub mod source;
pub mod util;

pub use error::{ErrorKind, ParseError, Result};
pub use options::Options;
pub use parser::{parse_file, parse_str, Parser};
pub use printer::{to_string, to_string_pretty};
pub use source::Position;
pub use util::{Expr, Positioned, Value};
