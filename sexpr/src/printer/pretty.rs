use std::convert::Infallible;

use crate::escape::{escape_string, escape_token};

use super::{Print, Printer};
use pretty::DocAllocator as _;

/// A pretty printer that uses the `pretty` crate to format the output.
struct PrettyPrinter<'a> {
    arena: &'a pretty::Arena<'a>,
    items: Vec<pretty::DocBuilder<'a, pretty::Arena<'a>>>,
}

impl<'a> Printer for PrettyPrinter<'a> {
    type Error = Infallible;

    fn token(&mut self, token: &[u8]) -> Result<(), Self::Error> {
        let doc = self.arena.text(escape_token(token));
        self.items.push(doc);
        Ok(())
    }

    fn string(&mut self, string: &[u8]) -> Result<(), Self::Error> {
        let doc = self.arena.text(escape_string(string));
        self.items.push(doc);
        Ok(())
    }

    fn int(&mut self, int: i128) -> Result<(), Self::Error> {
        let doc = self.arena.text(int.to_string());
        self.items.push(doc);
        Ok(())
    }

    fn list<F>(&mut self, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Self::Error>,
    {
        let position = self.items.len();
        f(self)?;
        let items = self.items.drain(position..);

        let docs = self
            .arena
            .intersperse(items, self.arena.line())
            .nest(2)
            .group();

        self.items.push(
            self.arena
                .text("(")
                .append(docs)
                .append(self.arena.text(")")),
        );

        Ok(())
    }
}

/// Pretty print a `T` into an s-expression string, breaking lists that do
/// not fit in `width` columns over several lines.
///
/// Top-level expressions are separated by a blank line.
pub fn to_string_pretty<T: Print>(value: T, width: usize) -> String {
    let arena = pretty::Arena::new();
    let mut printer = PrettyPrinter {
        items: vec![],
        arena: &arena,
    };

    let _ = value.print(&mut printer);

    let double_line = arena.line().append(arena.line());
    let doc = arena.intersperse(printer.items, double_line);

    let mut string = String::new();
    let _ = doc.render_fmt(width, &mut string);
    string
}

#[cfg(test)]
mod test {
    use super::to_string_pretty;
    use crate::util::Value;

    fn sample() -> Value {
        Value::list([
            Value::Token(b"define".to_vec()),
            Value::Token(b"greeting".to_vec()),
            Value::string("hello world"),
        ])
    }

    #[test]
    fn fits_on_one_line() {
        assert_eq!(
            to_string_pretty(sample(), 80),
            r#"(define greeting "hello world")"#
        );
    }

    #[test]
    fn breaks_long_lists() {
        assert_eq!(
            to_string_pretty(sample(), 10),
            "(define\n  greeting\n  \"hello world\")"
        );
    }

    #[test]
    fn separates_top_level_values() {
        let values = vec![Value::from(1i64), Value::from(2i64)];
        assert_eq!(to_string_pretty(&values, 80), "1\n\n2");
    }
}
