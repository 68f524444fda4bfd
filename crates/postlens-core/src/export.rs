//! Pass-through export of extracted text.

use std::io::{self, Write};

/// Destination for extracted text, e.g. a clipboard.
pub trait TextSink {
    /// Hand over `text` unchanged.
    fn put_text(&mut self, text: &str) -> io::Result<()>;
}

/// Writes text as UTF-8 to any [`Write`].
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TextSink for WriterSink<W> {
    fn put_text(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.flush()
    }
}

impl TextSink for String {
    fn put_text(&mut self, text: &str) -> io::Result<()> {
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_sink_is_byte_exact() {
        let mut sink = WriterSink::new(Vec::new());
        sink.put_text("\nA B\nżółw").unwrap();
        assert_eq!(sink.into_inner(), "\nA B\nżółw".as_bytes());
    }

    #[test]
    fn test_string_sink_replaces_contents() {
        let mut clipboard = String::from("old");
        clipboard.put_text("new").unwrap();
        assert_eq!(clipboard, "new");
    }
}
