//! Forward-only character cursor with source position tracking.
//!
//! Two concrete forms share the `Stream` trait: a text-backed stream over
//! an in-memory `&str`, and a file-backed stream over an open `File`. The
//! byte-offset rule differs between them (a file cursor vs. accumulated
//! UTF-8 length), so each computes it the way it naturally can rather
//! than forcing both behind one `Read` impl.

use std::fs::File;
use std::io::{self, Read};
use std::str::Chars;

/// A position within a source text: 1-indexed line/column, 0-indexed byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
    pub filename: Option<String>,
}

impl Position {
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 0,
            offset: 0,
            filename: None,
        }
    }

    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::start()
        }
    }

    fn advance_over(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

/// A single-pass forward-only character cursor.
pub trait Stream {
    /// Advances to the next character, returning it (or `None` at end of input).
    fn advance(&mut self) -> Option<char>;

    /// The position of the character last returned by `advance`.
    fn position(&self) -> &Position;
}

/// A `Stream` over an in-memory string.
pub struct TextStream<'a> {
    chars: Chars<'a>,
    position: Position,
    current: Option<char>,
}

impl<'a> TextStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            position: Position::start(),
            current: None,
        }
    }
}

impl<'a> Stream for TextStream<'a> {
    fn advance(&mut self) -> Option<char> {
        self.current = self.chars.next();
        if let Some(c) = self.current {
            self.position.advance_over(c);
            self.position.offset += c.len_utf8() as u32;
        }
        self.current
    }

    fn position(&self) -> &Position {
        &self.position
    }
}

/// A `Stream` over an open file, releasing the handle on drop.
pub struct FileStream {
    file: File,
    position: Position,
    current: Option<char>,
}

impl FileStream {
    pub fn open(path: impl AsRef<std::path::Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self {
            file,
            position: Position::with_filename(path.to_string_lossy()),
            current: None,
        })
    }

    fn read_char(&mut self) -> Option<char> {
        let mut buf = [0u8; 4];
        let mut len = 0;
        loop {
            let read = self.file.read(&mut buf[len..len + 1]).ok()?;
            if read == 0 {
                return None;
            }
            len += 1;
            if let Ok(s) = std::str::from_utf8(&buf[..len]) {
                return s.chars().next();
            }
            if len == 4 {
                return None;
            }
        }
    }
}

impl Stream for FileStream {
    fn advance(&mut self) -> Option<char> {
        self.current = self.read_char();
        if let Some(c) = self.current {
            self.position.advance_over(c);
            self.position.offset = self.file.stream_position().unwrap_or(0) as u32;
        }
        self.current
    }

    fn position(&self) -> &Position {
        &self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_stream_starts_before_first_char() {
        let s = TextStream::new("ab");
        assert_eq!(s.position().line, 1);
        assert_eq!(s.position().column, 0);
    }

    #[test]
    fn text_stream_first_advance_lands_on_column_one() {
        let mut s = TextStream::new("ab");
        assert_eq!(s.advance(), Some('a'));
        assert_eq!(s.position().column, 1);
        assert_eq!(s.position().line, 1);
    }

    #[test]
    fn text_stream_tracks_newlines() {
        let mut s = TextStream::new("a\nb");
        assert_eq!(s.advance(), Some('a'));
        assert_eq!(s.advance(), Some('\n'));
        assert_eq!(s.position().line, 2);
        assert_eq!(s.position().column, 1);
        assert_eq!(s.advance(), Some('b'));
        assert_eq!(s.position().line, 2);
        assert_eq!(s.position().column, 2);
    }

    #[test]
    fn text_stream_position_monotonic() {
        let mut s = TextStream::new("hello\nworld");
        let mut last_offset = s.position().offset;
        while let Some(_) = s.advance() {
            assert!(s.position().offset >= last_offset);
            last_offset = s.position().offset;
        }
    }

    #[test]
    fn text_stream_ends_empty() {
        let mut s = TextStream::new("a");
        assert_eq!(s.advance(), Some('a'));
        assert_eq!(s.advance(), None);
        assert_eq!(s.advance(), None);
    }

    #[test]
    fn file_stream_reads_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        write!(file, "hi").unwrap();
        let mut s = FileStream::open(file.path()).unwrap();
        assert_eq!(s.advance(), Some('h'));
        assert_eq!(s.advance(), Some('i'));
        assert_eq!(s.advance(), None);
    }
}
