use crate::escape::{escape_string, escape_token};
use std::convert::Infallible;
use std::fmt::Write as _;

use super::{Print, Printer};

/// Prints everything on one line, separated by single spaces.
struct SimplePrinter {
    needs_whitespace: bool,
    string: String,
}

impl SimplePrinter {
    pub fn new() -> Self {
        Self {
            needs_whitespace: false,
            string: String::new(),
        }
    }

    #[inline]
    fn separate(&mut self) {
        if self.needs_whitespace {
            self.string.push(' ');
        }
        self.needs_whitespace = true;
    }
}

impl Printer for SimplePrinter {
    type Error = Infallible;

    fn token(&mut self, token: &[u8]) -> Result<(), Self::Error> {
        self.separate();
        self.string.push_str(&escape_token(token));
        Ok(())
    }

    fn string(&mut self, string: &[u8]) -> Result<(), Self::Error> {
        self.separate();
        self.string.push_str(&escape_string(string));
        Ok(())
    }

    fn int(&mut self, int: i128) -> Result<(), Self::Error> {
        self.separate();
        let _ = write!(&mut self.string, "{}", int);
        Ok(())
    }

    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        self.separate();
        self.string.push('(');
        self.needs_whitespace = false;
        f(self)?;
        self.string.push(')');
        self.needs_whitespace = true;

        Ok(())
    }
}

/// Print a `T` into an s-expression string.
///
/// This function does not produce any line breaks, indentation, or unnecessary whitespace:
/// list items are joined by a single space. Where human readability is a concern,
/// consider using the [`to_string_pretty`] function instead.
///
/// [`to_string_pretty`]: `crate::printer::to_string_pretty`
pub fn to_string<T: Print>(value: T) -> String {
    let mut printer = SimplePrinter::new();
    let _ = value.print(&mut printer);
    printer.string
}
