use std::fmt::{self, Display};
use std::io::BufRead;
use std::iter::FusedIterator;

use delegate::delegate;
use tracing::warn;

use crate::error::{ErrorKind, ParseError, Result};
use crate::options::Options;
use crate::source::{Position, Source};
use crate::util::Positioned;

/// One unit of raw syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    BeginList,
    EndList,
    /// Decoded contents of a quoted string, without the quotes.
    String(Vec<u8>),
    /// Decoded bytes of a bare token. Never empty.
    Token(Vec<u8>),
}

/// A token that runs straight into a delimiter, such as `a(b)`.
///
/// This is accepted, but is easy to misread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub position: Position,
    pub delimiter: u8,
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: some parsers may have difficulty with a '{}' attached to a token",
            self.position,
            char::from(self.delimiter)
        )
    }
}

/// Splits a [`Source`] into [`Lexeme`]s, one at a time.
///
/// The lexer balances parentheses: an unmatched `)` is reported where it
/// occurs, and running out of input inside a list is reported at the `(`
/// that opened it.
#[derive(Debug)]
pub struct Lexer<R> {
    source: Source<R>,
    /// Positions of the currently open lists, innermost last.
    depth: Vec<Position>,
    warnings: Vec<Warning>,
    options: Options,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(source: Source<R>) -> Self {
        Self::with_options(source, Options::default())
    }

    pub fn with_options(source: Source<R>, options: Options) -> Self {
        Self {
            source,
            depth: Vec::new(),
            warnings: Vec::new(),
            options,
        }
    }

    /// Reads the next lexeme, or `None` at the end of input.
    ///
    /// The lexer is closed when this fails, so every later call returns `None`.
    pub fn next_lexeme(&mut self) -> Result<Option<Positioned<Lexeme>>> {
        self.scan().inspect_err(|_| self.close())
    }

    fn scan(&mut self) -> Result<Option<Positioned<Lexeme>>> {
        self.source.disarm_eof_message();

        loop {
            match self.source.peek() {
                Some(b' ' | b'\n') => self.source.advance()?,
                Some(_) => break,
                None => {
                    return match self.depth.last() {
                        Some(open) => Err(ParseError::new(ErrorKind::UnmatchedOpen, open.clone())),
                        None => Ok(None),
                    };
                }
            }
        }

        let position = self.source.position();
        let Some(ch) = self.source.get_and_advance()? else {
            return Ok(None);
        };

        let lexeme = match ch {
            b'(' => {
                self.depth.push(position.clone());
                Lexeme::BeginList
            }
            b')' => {
                if self.depth.pop().is_none() {
                    return Err(ParseError::new(ErrorKind::UnmatchedClose, position));
                }
                Lexeme::EndList
            }
            b'"' => Lexeme::String(self.string_body()?),
            _ => Lexeme::Token(self.token_body(ch)?),
        };

        Ok(Some(Positioned::new(lexeme, position)))
    }

    /// Reads the rest of a string literal after its opening quote.
    fn string_body(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.source.arm_eof_message(ErrorKind::EofInString);

        loop {
            match self.required()? {
                b'"' => break,
                b'\\' => {
                    self.source.arm_eof_message(ErrorKind::EofInStringEscape);
                    bytes.push(self.read_after_backslash()?);
                    self.source.arm_eof_message(ErrorKind::EofInString);
                }
                ch => bytes.push(ch),
            }
        }

        self.source.disarm_eof_message();
        Ok(bytes)
    }

    /// Reads the rest of a bare token whose first byte was `first`.
    ///
    /// The token ends at whitespace or the end of input. A delimiter also
    /// ends it, but is left for the next lexeme.
    fn token_body(&mut self, first: u8) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.push_token_byte(first, &mut bytes)?;

        while let Some(ch) = self.source.peek() {
            match ch {
                b' ' | b'\n' => break,
                b'(' | b'"' | b')' => {
                    self.warn_adjacent(ch);
                    break;
                }
                _ => {
                    self.source.advance()?;
                    self.push_token_byte(ch, &mut bytes)?;
                }
            }
        }

        Ok(bytes)
    }

    fn push_token_byte(&mut self, ch: u8, bytes: &mut Vec<u8>) -> Result<()> {
        if ch == b'\\' {
            self.source.arm_eof_message(ErrorKind::EofInTokenEscape);
            bytes.push(self.read_after_backslash()?);
            self.source.disarm_eof_message();
        } else {
            bytes.push(ch);
        }
        Ok(())
    }

    fn warn_adjacent(&mut self, delimiter: u8) {
        if !self.options.warn_adjacent_delimiter {
            return;
        }

        let warning = Warning {
            position: self.source.position(),
            delimiter,
        };
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Decodes the escape sequence following a backslash.
    ///
    /// An end-of-input message must be armed before calling this.
    fn read_after_backslash(&mut self) -> Result<u8> {
        let position = self.source.position();
        let ch = self.required()?;

        let byte = match ch {
            b' ' | b'\n' | b'"' | b'\'' | b'\\' => ch,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'a' => 0x07,
            b'b' => 0x08,
            b'e' => 0x1b,
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'x' => {
                let high = self.hex_digit()?;
                let low = self.hex_digit()?;
                (high << 4) | low
            }
            b'0'..=b'7' => {
                let mut value = u32::from(ch - b'0');
                for _ in 0..2 {
                    match self.source.peek() {
                        Some(digit @ b'0'..=b'7') => {
                            self.source.advance()?;
                            value = value * 8 + u32::from(digit - b'0');
                        }
                        _ => break,
                    }
                }
                u8::try_from(value)
                    .map_err(|_| ParseError::new(ErrorKind::OctalOutOfRange, position))?
            }
            _ => {
                return Err(ParseError::new(
                    ErrorKind::UnexpectedEscape(char::from(ch)),
                    position,
                ))
            }
        };

        Ok(byte)
    }

    fn hex_digit(&mut self) -> Result<u8> {
        let position = self.source.position();
        let ch = self.required()?;
        match char::from(ch).to_digit(16) {
            // A hex digit is below 16.
            Some(digit) => Ok(digit as u8),
            None => Err(ParseError::new(
                ErrorKind::NonHexDigit(char::from(ch)),
                position,
            )),
        }
    }

    /// Reads a byte while an end-of-input message is armed.
    fn required(&mut self) -> Result<u8> {
        match self.source.get_and_advance()? {
            Some(ch) => Ok(ch),
            // Only reachable if nothing was armed.
            None => Err(ParseError::new(
                ErrorKind::EofInString,
                self.source.position(),
            )),
        }
    }
}

impl<R> Lexer<R> {
    /// Warnings produced so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Removes and returns the warnings produced so far.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Releases the source and forgets any open lists.
    pub(crate) fn close(&mut self) {
        self.source.close();
        self.depth.clear();
    }

    /// Number of lists currently open.
    pub fn depth(&self) -> usize {
        self.depth.len()
    }

    delegate! {
        to self.source {
            pub fn position(&self) -> Position;
            pub fn shebang(&self) -> Option<&[u8]>;
            pub fn filename(&self) -> &str;
        }
    }
}

impl<R: BufRead> Iterator for Lexer<R> {
    type Item = Result<Positioned<Lexeme>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_lexeme().transpose()
    }
}

impl<R: BufRead> FusedIterator for Lexer<R> {}
