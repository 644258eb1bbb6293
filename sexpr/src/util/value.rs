use std::fmt::{self, Display};

use crate::number::{parse_int, IntOutOfRange};
use crate::printer::{to_string, Print, Printer};
use crate::util::Positioned;
use proptest::arbitrary::Arbitrary;

/// An expression together with where it was read from.
pub type Expr = Positioned<Value>;

/// An s-expression represented as a recursive enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A token that reads as an integer literal. Held with more range than
    /// `i64` so that large literals survive; see [`Value::fits_in_i64`].
    Int(i128),
    /// A quoted string.
    String(Vec<u8>),
    /// A bare token. Never empty, and never an integer literal.
    Token(Vec<u8>),
    List(Vec<Expr>),
}

impl Value {
    /// Classifies the bytes of a bare token, the same way the parser does.
    pub fn from_token(bytes: Vec<u8>) -> Result<Self, IntOutOfRange> {
        debug_assert!(!bytes.is_empty(), "tokens are never empty");
        Ok(match parse_int(&bytes)? {
            Some(int) => Value::Int(int),
            None => Value::Token(bytes),
        })
    }

    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Value::String(bytes.into())
    }

    /// Builds a list from values that have no source position.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().map(Positioned::unpositioned).collect())
    }

    /// Whether this is an integer representable as an `i64`.
    pub fn fits_in_i64(&self) -> bool {
        self.as_i64().is_some()
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(int) => i64::try_from(*int).ok(),
            _ => None,
        }
    }

    /// The bytes of a string or token.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(bytes) | Value::Token(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Print for Value {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), P::Error> {
        match self {
            Value::Int(int) => printer.int(*int),
            Value::String(string) => printer.string(string),
            Value::Token(token) => printer.token(token),
            Value::List(items) => printer.list(|printer| printer.print(items)),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value.into_bytes())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.as_bytes().to_vec())
    }
}

impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let bytes = |min: usize| proptest::collection::vec(any::<u8>(), min..16);
        let leaf = proptest::prop_oneof![
            any::<i64>().prop_map(Value::from),
            bytes(0).prop_map(Value::String),
            bytes(1).prop_filter_map("integer literal out of range", |bytes| {
                Value::from_token(bytes).ok()
            }),
        ];
        leaf.prop_recursive(8, 256, 10, |inner| {
            proptest::collection::vec(inner, 0..10).prop_map(|items| Value::list(items))
        })
        .boxed()
    }
}
