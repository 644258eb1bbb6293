//! Parse s-expressions from a byte stream.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use delegate::delegate;
use smol_str::SmolStr;

use crate::error::{ErrorKind, ParseError, Result};
use crate::lexer::{Lexeme, Lexer, Warning};
use crate::options::Options;
use crate::source::{Position, Source};
use crate::util::{Expr, Positioned, Value};

/// Builds [`Expr`] trees from the lexemes of a [`Lexer`].
///
/// Each call to [`Parser::next_expr`] reads exactly one top-level expression.
/// Lists become [`Value::List`] positioned at their `(`, and tokens that read
/// as integer literals become [`Value::Int`].
///
/// The parser is also an iterator. It stops after the first error.
#[derive(Debug)]
pub struct Parser<R> {
    lexer: Lexer<R>,
    finished: bool,
}

impl Parser<BufReader<File>> {
    /// Opens a parser over the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, Options::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let source = Source::open_with_options(path, options)?;
        Ok(Self::new(Lexer::with_options(source, options)))
    }
}

impl<'a> Parser<&'a [u8]> {
    /// Opens a parser over in-memory text, reported under `name`.
    pub fn from_text(name: impl Into<SmolStr>, text: &'a str) -> Result<Self> {
        Self::from_bytes(name, text.as_bytes(), Options::default())
    }

    pub fn from_bytes(name: impl Into<SmolStr>, bytes: &'a [u8], options: Options) -> Result<Self> {
        let source = Source::with_options(name, bytes, options)?;
        Ok(Self::new(Lexer::with_options(source, options)))
    }
}

impl<R: BufRead> Parser<R> {
    pub fn new(lexer: Lexer<R>) -> Self {
        Self {
            lexer,
            finished: false,
        }
    }

    /// Reads the next top-level expression, or `None` once the input is used up.
    ///
    /// The input is released as soon as this fails or runs out.
    pub fn next_expr(&mut self) -> Result<Option<Expr>> {
        if self.finished {
            return Ok(None);
        }

        let result = self.parse_expr();
        match &result {
            Ok(Some(_)) => {}
            Ok(None) => self.finished = true,
            Err(_) => {
                self.finished = true;
                self.lexer.close();
            }
        }
        result
    }

    fn parse_expr(&mut self) -> Result<Option<Expr>> {
        // Lists still being collected, innermost last.
        let mut open: Vec<(Position, Vec<Expr>)> = Vec::new();

        loop {
            let Some(lexeme) = self.lexer.next_lexeme()? else {
                // The lexer reports unclosed lists itself.
                debug_assert!(open.is_empty());
                return Ok(None);
            };

            let Positioned { inner, position } = lexeme;
            let expr = match inner {
                Lexeme::BeginList => {
                    open.push((position, Vec::new()));
                    continue;
                }
                Lexeme::EndList => {
                    let (start, items) = open
                        .pop()
                        .ok_or_else(|| ParseError::new(ErrorKind::UnmatchedClose, position))?;
                    Positioned::new(Value::List(items), start)
                }
                Lexeme::String(bytes) => Positioned::new(Value::String(bytes), position),
                Lexeme::Token(bytes) => match Value::from_token(bytes) {
                    Ok(value) => Positioned::new(value, position),
                    Err(_) => return Err(ParseError::new(ErrorKind::IntOutOfRange, position)),
                },
            };

            match open.last_mut() {
                Some((_, items)) => items.push(expr),
                None => return Ok(Some(expr)),
            }
        }
    }
}

impl<R> Parser<R> {
    delegate! {
        to self.lexer {
            pub fn position(&self) -> Position;
            pub fn shebang(&self) -> Option<&[u8]>;
            pub fn filename(&self) -> &str;
            pub fn warnings(&self) -> &[Warning];
            pub fn take_warnings(&mut self) -> Vec<Warning>;
        }
    }
}

impl<R: BufRead> Iterator for Parser<R> {
    type Item = Result<Expr>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_expr().transpose()
    }
}

impl<R: BufRead> std::iter::FusedIterator for Parser<R> {}

/// Parse every top-level expression in `text`, reporting positions under `name`.
pub fn parse_str(name: impl Into<SmolStr>, text: &str) -> Result<Vec<Expr>> {
    Parser::from_text(name, text)?.collect()
}

/// Parse every top-level expression in the file at `path`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Expr>> {
    Parser::open(path)?.collect()
}

#[cfg(test)]
mod test {
    use super::{parse_file, parse_str, Parser};
    use crate::error::{ErrorKind, ParseError};
    use crate::lexer::Lexer;
    use crate::source::test::DropFlag;
    use crate::source::Source;
    use crate::util::{Expr, Value};
    use proptest::prelude::*;
    use rstest::rstest;
    use std::cell::Cell;
    use std::rc::Rc;

    fn parse(text: &str) -> Result<Vec<Value>, ParseError> {
        Ok(parse_str("test", text)?
            .into_iter()
            .map(Expr::into_inner)
            .collect())
    }

    fn parse_one(text: &str) -> Value {
        let mut values = parse(text).unwrap();
        assert_eq!(values.len(), 1);
        values.remove(0)
    }

    fn token(bytes: &[u8]) -> Value {
        Value::Token(bytes.to_vec())
    }

    fn int(value: i128) -> Value {
        Value::Int(value)
    }

    fn depth(value: &Value) -> usize {
        match value {
            Value::List(items) => 1 + items.iter().map(|item| depth(&item.inner)).max().unwrap_or(0),
            _ => 0,
        }
    }

    #[test]
    fn flat_list() {
        assert_eq!(
            parse_one("(a b c)"),
            Value::list([token(b"a"), token(b"b"), token(b"c")])
        );
    }

    #[test]
    fn nested_list() {
        assert_eq!(
            parse_one("(1 (2 3) 4)"),
            Value::list([int(1), Value::list([int(2), int(3)]), int(4)])
        );
    }

    #[test]
    fn hex_escaped_string() {
        assert_eq!(parse_one(r#""\x41\x42""#), Value::string("AB"));
    }

    #[rstest]
    #[case("42", 42)]
    #[case("-7", -7)]
    #[case("0x2A", 42)]
    #[case("0o52", 42)]
    #[case("017", 15)]
    #[case(r"\x34\x32", 42)]
    fn integer_tokens(#[case] text: &str, #[case] expected: i128) {
        assert_eq!(parse_one(text), int(expected));
    }

    #[rstest]
    #[case("abc")]
    #[case("1.5")]
    #[case("-")]
    fn plain_tokens(#[case] text: &str) {
        assert_eq!(parse_one(text), token(text.as_bytes()));
    }

    #[test]
    fn quoted_number_is_a_string() {
        assert_eq!(parse_one(r#""42""#), Value::string("42"));
    }

    #[test]
    fn out_of_range_literal_still_parses() {
        let value = parse_one("9223372036854775808");
        assert_eq!(value, int(9_223_372_036_854_775_808));
        assert!(!value.fits_in_i64());
    }

    #[test]
    fn literal_beyond_working_range_fails() {
        let err = parse("(x 0xfffffffffffffffffffffffffffffffff)").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IntOutOfRange);
        assert_eq!(err.position().column, 4);
    }

    #[rstest]
    #[case(&b"0xfffffffffffffffffffffffffffffffff\n(more)\n"[..], ErrorKind::IntOutOfRange)]
    #[case(&b")\n(more)\n"[..], ErrorKind::UnmatchedClose)]
    #[case(&b"(a \"b\\q\")\n(more)\n"[..], ErrorKind::UnexpectedEscape('q'))]
    fn releases_input_on_error(#[case] text: &[u8], #[case] kind: ErrorKind) {
        let dropped = Rc::new(Cell::new(false));
        let reader = DropFlag {
            inner: text,
            dropped: dropped.clone(),
        };
        let mut parser = Parser::new(Lexer::new(Source::new("test", reader).unwrap()));
        assert!(!dropped.get());
        assert_eq!(parser.next_expr().unwrap_err().kind(), &kind);
        assert!(dropped.get());
        assert!(parser.next_expr().unwrap().is_none());
    }

    #[test]
    fn several_top_level_expressions() {
        assert_eq!(
            parse("a\n(b)\n\"c\" 1\n").unwrap(),
            vec![token(b"a"), Value::list([token(b"b")]), Value::string("c"), int(1)]
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("\n  \n").unwrap(), vec![]);
    }

    #[test]
    fn positions_are_recorded() {
        let exprs = parse_str("file.sexp", "\n  (a\n   (b))").unwrap();
        let list = &exprs[0];
        assert_eq!(list.position.filename, "file.sexp");
        assert_eq!((list.position.line, list.position.column), (2, 3));

        let items = list.inner.as_list().unwrap();
        assert_eq!((items[0].position.line, items[0].position.column), (2, 4));
        assert_eq!((items[1].position.line, items[1].position.column), (3, 4));
        assert_eq!(&*items[1].position.text, b"   (b))");
    }

    #[test]
    fn lone_open_paren() {
        let err = parse("(").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnmatchedOpen);
        assert_eq!((err.position().line, err.position().column), (1, 1));
    }

    #[test]
    fn lone_close_paren() {
        let err = parse(")").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnmatchedClose);
        assert_eq!((err.position().line, err.position().column), (1, 1));
    }

    #[test]
    fn tab_is_rejected() {
        let err = parse("(a\n\tb)\n").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Tab);
        assert_eq!(err.position().line, 2);
    }

    #[test]
    fn carriage_return_is_rejected() {
        let err = parse("(a)\r\n").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CarriageReturn);
    }

    #[test]
    fn stops_after_error() {
        let mut parser = Parser::from_text("test", "a ) b").unwrap();
        assert_eq!(parser.next().unwrap().unwrap().into_inner(), token(b"a"));
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }

    #[test]
    fn expressions_are_pulled_lazily() {
        let mut parser = Parser::from_text("test", "(a) )").unwrap();
        let first = parser.next_expr().unwrap().unwrap();
        assert_eq!(first.into_inner(), Value::list([token(b"a")]));
        assert_eq!(parser.next_expr().unwrap_err().kind(), &ErrorKind::UnmatchedClose);
    }

    #[test]
    fn warns_about_adjacent_delimiters() {
        let mut parser = Parser::from_text("test", "(f(x))").unwrap();
        let value = parser.next_expr().unwrap().unwrap().into_inner();
        assert_eq!(value, Value::list([token(b"f"), Value::list([token(b"x")])]));
        assert_eq!(parser.warnings().len(), 2);
        assert_eq!(parser.take_warnings().len(), 2);
        assert!(parser.warnings().is_empty());
    }

    #[test]
    fn shebang_is_skipped() {
        let mut parser = Parser::from_text("test", "#!/usr/bin/env sexpr (\n(a)\n").unwrap();
        assert_eq!(parser.shebang(), Some(&b"#!/usr/bin/env sexpr (\n"[..]));
        let expr = parser.next_expr().unwrap().unwrap();
        assert_eq!(expr.position.line, 2);
        assert!(parser.next_expr().unwrap().is_none());
    }

    #[test]
    fn list_children_grow_geometrically() {
        let count = 1000;
        let text = format!("({})", vec!["x"; count].join(" "));
        let value = parse_one(&text);
        let Value::List(items) = value else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), count);
        assert!(items.capacity() < 2 * count);
    }

    #[test]
    fn parses_files() {
        let path = std::env::temp_dir().join(format!("sexpr-parser-{}.sexp", std::process::id()));
        std::fs::write(&path, "#!/bin/run\n(a \"b\")\n7\n").unwrap();
        let values: Vec<_> = parse_file(&path)
            .unwrap()
            .into_iter()
            .map(Expr::into_inner)
            .collect();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            values,
            vec![Value::list([token(b"a"), Value::string("b")]), int(7)]
        );
    }

    #[test]
    fn missing_file() {
        let err = Parser::open("/nonexistent/input.sexp").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
    }

    proptest! {
        #[test]
        fn balanced_parens_nest(depth_wanted in 0usize..200) {
            let text = format!("{}{}", "(".repeat(depth_wanted), ")".repeat(depth_wanted));
            let values = parse(&text).unwrap();
            if depth_wanted == 0 {
                prop_assert!(values.is_empty());
            } else {
                prop_assert_eq!(values.len(), 1);
                prop_assert_eq!(depth(&values[0]), depth_wanted);
            }
        }

        #[test]
        fn unbalanced_parens_fail(open in 1usize..50, close in 0usize..50) {
            prop_assume!(open != close);
            let text = format!("{}{}", "(".repeat(open), ")".repeat(close));
            let err = parse(&text).unwrap_err();
            let expected = if open > close {
                ErrorKind::UnmatchedOpen
            } else {
                ErrorKind::UnmatchedClose
            };
            prop_assert_eq!(err.kind(), &expected);
        }
    }
}
