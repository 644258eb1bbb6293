//! The expression tree produced by the parser.
mod positioned;
mod value;

pub use positioned::Positioned;
pub use value::{Expr, Value};
