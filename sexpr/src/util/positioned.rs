use crate::printer::{Print, Printer};
use crate::source::Position;

/// Records the source position around an inner type.
///
/// The position is metadata: two `Positioned` values compare equal when
/// their inner values do, wherever they were read from.
#[derive(Debug, Clone)]
pub struct Positioned<T> {
    pub inner: T,
    pub position: Position,
}

impl<T> Positioned<T> {
    pub fn new(inner: T, position: Position) -> Self {
        Self { inner, position }
    }

    /// Wraps a value that was not read from any input.
    pub fn unpositioned(inner: T) -> Self {
        Self::new(inner, Position::unknown())
    }

    /// Converts into the inner type.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: PartialEq> PartialEq for Positioned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Eq> Eq for Positioned<T> {}

impl<T: Print> Print for Positioned<T> {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        self.inner.print(printer)
    }
}
