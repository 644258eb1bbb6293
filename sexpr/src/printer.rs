//! Print values as s-expressions.
//!
//! Everything printed here reads back through [`crate::parser`] to the same
//! values.
use std::rc::Rc;
use std::sync::Arc;
mod pretty;
mod simple;
pub use pretty::to_string_pretty;
pub use simple::to_string;

/// Trait for types that can print s-expressions.
pub trait Printer: Sized {
    type Error;

    /// Print a bare token.
    fn token(&mut self, token: &[u8]) -> Result<(), Self::Error>;

    /// Print a string.
    fn string(&mut self, string: &[u8]) -> Result<(), Self::Error>;

    /// Print an integer.
    fn int(&mut self, int: i128) -> Result<(), Self::Error>;

    /// Print a list given a function that prints the contents.
    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>;

    /// Print a printable value.
    fn print(&mut self, value: impl Print) -> Result<(), Self::Error> {
        value.print(self)
    }
}

/// Trait for types that can be printed as an s-expression.
pub trait Print {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error>;
}

impl<T: Print + ?Sized> Print for &T {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        (**self).print(printer)
    }
}

impl<T: Print + ?Sized> Print for Box<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Rc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

impl<T: Print + ?Sized> Print for Arc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_ref())
    }
}

/// Prints the items one after another, as the contents of a list or as
/// separate top-level expressions.
impl<T: Print> Print for [T] {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        for item in self {
            printer.print(item)?;
        }
        Ok(())
    }
}

impl<T: Print> Print for Vec<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        printer.print(self.as_slice())
    }
}
