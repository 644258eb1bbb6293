/// Knobs shared by the source, lexer and parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Discard a first line starting with `#!`. The line stays available
    /// through [`Source::shebang`](crate::source::Source::shebang).
    pub skip_shebang: bool,
    /// Warn when a token runs straight into `(`, `"` or `)`.
    pub warn_adjacent_delimiter: bool,
}

impl Options {
    pub fn skip_shebang(mut self, skip: bool) -> Self {
        self.skip_shebang = skip;
        self
    }

    pub fn warn_adjacent_delimiter(mut self, warn: bool) -> Self {
        self.warn_adjacent_delimiter = warn;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            skip_shebang: true,
            warn_adjacent_delimiter: true,
        }
    }
}
