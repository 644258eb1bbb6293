//! Line-buffered byte source that keeps track of where it is.
use std::borrow::Cow;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::error::{ErrorKind, ParseError, Result};
use crate::options::Options;

/// Snapshot of a location in some input.
///
/// `line` and `column` are 1-based. `text` is the whole physical line the
/// location falls on, including its trailing newline if it had one; it is
/// empty at the end of input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub filename: SmolStr,
    pub line: usize,
    pub column: usize,
    pub text: Arc<[u8]>,
}

impl Position {
    /// The position of something that was not read from any input.
    pub fn unknown() -> Self {
        Self::start("")
    }

    /// The position before the first line of `filename`.
    pub fn start(filename: impl Into<SmolStr>) -> Self {
        Position {
            filename: filename.into(),
            line: 0,
            column: 0,
            text: Arc::from(&[][..]),
        }
    }

    /// The line text, with invalid UTF-8 replaced.
    pub fn line_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// A byte source over a [`BufRead`] that reads one physical line at a time.
///
/// Every line is checked for raw control characters as soon as it is loaded,
/// so errors can show the complete offending line.
///
/// Reaching the end of input is normally not an error: [`Source::peek`] just
/// returns `None`. While an end-of-input message is armed with
/// [`Source::arm_eof_message`], reading past the end fails with that message
/// instead.
///
/// The reader is dropped as soon as the input is exhausted or an error occurs.
pub struct Source<R> {
    reader: Option<R>,
    filename: SmolStr,
    line: usize,
    column: usize,
    text: Arc<[u8]>,
    eof_message: Option<ErrorKind>,
    shebang: Option<Arc<[u8]>>,
    /// Number and text of the last line with something on it.
    last_line: Option<(usize, Arc<[u8]>)>,
}

impl<R> fmt::Debug for Source<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("filename", &self.filename)
            .field("line", &self.line)
            .field("column", &self.column)
            .field("open", &self.reader.is_some())
            .finish()
    }
}

impl Source<BufReader<File>> {
    /// Opens the file at `path`. The file is closed once it has been read to
    /// the end, or when reading fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, Options::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let path = path.as_ref();
        let filename = SmolStr::from(path.display().to_string());
        let file = File::open(path)
            .map_err(|err| ParseError::io(&err, Position::start(filename.clone())))?;
        debug!(%filename, "opened source file");
        Self::with_options(filename, BufReader::new(file), options)
    }
}

impl<R: BufRead> Source<R> {
    /// Wraps `reader`, reporting positions under `filename`.
    pub fn new(filename: impl Into<SmolStr>, reader: R) -> Result<Self> {
        Self::with_options(filename, reader, Options::default())
    }

    pub fn with_options(filename: impl Into<SmolStr>, reader: R, options: Options) -> Result<Self> {
        let mut source = Source {
            reader: Some(reader),
            filename: filename.into(),
            line: 0,
            column: 0,
            text: Arc::from(&[][..]),
            eof_message: None,
            shebang: None,
            last_line: None,
        };

        source.next_line()?;
        if options.skip_shebang && source.text.starts_with(b"#!") {
            debug!(filename = %source.filename, "skipping shebang line");
            source.shebang = Some(source.text.clone());
            source.next_line()?;
        }

        Ok(source)
    }

    fn next_line(&mut self) -> Result<()> {
        let mut buffer = Vec::new();
        if let Some(reader) = self.reader.as_mut() {
            if let Err(err) = reader.read_until(b'\n', &mut buffer) {
                let position = self.position();
                self.close();
                return Err(ParseError::io(&err, position));
            }
        }

        if !matches!(&*self.text, [] | [b'\n']) {
            self.last_line = Some((self.line, self.text.clone()));
        }

        self.line += 1;
        self.column = 0;
        self.text = buffer.into();

        if self.text.is_empty() {
            if self.reader.take().is_some() {
                trace!(filename = %self.filename, line = self.line, "end of input");
            }
            return Ok(());
        }

        if let Some((index, kind)) = forbidden_byte(&self.text) {
            let position = Position {
                column: index + 1,
                ..self.position()
            };
            self.close();
            return Err(ParseError::new(kind, position));
        }

        Ok(())
    }

    /// Consumes the current byte, loading the next line when this one is used up.
    pub fn advance(&mut self) -> Result<()> {
        if self.is_exhausted() {
            return self.check_eof();
        }

        self.column += 1;
        if self.column == self.text.len() {
            self.next_line()?;
        }
        Ok(())
    }

    /// Returns the current byte and advances past it.
    ///
    /// At the end of input this returns `Ok(None)`, or the armed
    /// end-of-input error.
    pub fn get_and_advance(&mut self) -> Result<Option<u8>> {
        match self.peek() {
            Some(ch) => {
                self.advance()?;
                Ok(Some(ch))
            }
            None => {
                self.check_eof()?;
                Ok(None)
            }
        }
    }

    fn check_eof(&self) -> Result<()> {
        match &self.eof_message {
            Some(kind) => Err(ParseError::new(kind.clone(), self.end_position())),
            None => Ok(()),
        }
    }

    /// Where the input ran out: just past the last character of the last
    /// non-empty line, so diagnostics can still show that line.
    fn end_position(&self) -> Position {
        match &self.last_line {
            Some((line, text)) => Position {
                filename: self.filename.clone(),
                line: *line,
                column: text.strip_suffix(b"\n").unwrap_or(&text[..]).len() + 1,
                text: text.clone(),
            },
            None => self.position(),
        }
    }
}

impl<R> Source<R> {
    /// The current byte, or `None` once the input is exhausted.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.text.get(self.column).copied()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.text.is_empty()
    }

    /// The position of the current byte.
    pub fn position(&self) -> Position {
        Position {
            filename: self.filename.clone(),
            line: self.line,
            column: self.column + 1,
            text: self.text.clone(),
        }
    }

    /// Makes running out of input an error with the given message, until
    /// [`Source::disarm_eof_message`] is called.
    pub fn arm_eof_message(&mut self, kind: ErrorKind) {
        self.eof_message = Some(kind);
    }

    pub fn disarm_eof_message(&mut self) {
        self.eof_message = None;
    }

    /// The `#!` line that was skipped at the start of the input, if any.
    pub fn shebang(&self) -> Option<&[u8]> {
        self.shebang.as_deref()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Whether the underlying reader is still held.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Drops the reader. Anything still buffered is discarded and the source
    /// behaves as exhausted from here on.
    pub fn close(&mut self) {
        self.reader = None;
        self.text = Arc::from(&[][..]);
        self.column = 0;
    }
}

/// Finds the first raw control character other than newline.
fn forbidden_byte(line: &[u8]) -> Option<(usize, ErrorKind)> {
    let index = line.iter().position(|&c| c < b' ' && c != b'\n')?;
    let kind = match line[index] {
        b'\t' => ErrorKind::Tab,
        b'\r' => ErrorKind::CarriageReturn,
        c => ErrorKind::ControlCharacter(c),
    };
    Some((index, kind))
}
