//! Transfer and header encodings used by the encoder.
//!
//! Supports Base64 with 76-column wrapping, text-mode Quoted-Printable and
//! RFC 2047 encoded-words.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{self, Write};

/// Maximum encoded line length for both transfer encodings (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Writes `data` as Base64 wrapped at [`MAX_LINE_LENGTH`] columns.
///
/// Lines are separated by CRLF. The last line is left unterminated so the
/// following multipart delimiter (which starts with CRLF) closes it without
/// producing an empty line.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_base64_wrapped<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    let encoded = encode_base64(data);
    let mut lines = encoded.as_bytes().chunks(MAX_LINE_LENGTH).peekable();

    while let Some(line) = lines.next() {
        out.write_all(line)?;
        if lines.peek().is_some() {
            out.write_all(b"\r\n")?;
        }
    }

    Ok(())
}

/// Encodes a header value as an RFC 2047 Base64 encoded-word.
///
/// Format: `=?charset?B?encoded-text?=`. The value is always encoded, pure
/// ASCII included.
#[must_use]
pub fn encode_word(text: &str, charset: &str) -> String {
    let encoded = encode_base64(text.as_bytes());
    format!("=?{charset}?B?{encoded}?=")
}

/// Streaming Quoted-Printable encoder in text mode.
///
/// CR, LF and CRLF are treated as hard line breaks and written as CRLF.
/// Whitespace at the end of a line is escaped, `=` and non-printable bytes
/// become `=XX`, and soft line breaks keep every line within
/// [`MAX_LINE_LENGTH`] columns. Call [`finish`](Self::finish) to flush the
/// final line.
#[derive(Debug)]
pub struct QuotedPrintableWriter<W: Write> {
    inner: W,
    line: [u8; MAX_LINE_LENGTH + 2],
    len: usize,
    cr: bool,
}

impl<W: Write> QuotedPrintableWriter<W> {
    /// Creates an encoder writing to `inner`.
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            line: [0; MAX_LINE_LENGTH + 2],
            len: 0,
            cr: false,
        }
    }

    /// Flushes the pending line and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the inner writer fails.
    pub fn finish(mut self) -> io::Result<W> {
        self.escape_trailing_whitespace()?;
        self.flush_line()?;
        Ok(self.inner)
    }

    fn push_literal(&mut self, byte: u8) -> io::Result<()> {
        if byte == b'\r' || byte == b'\n' {
            // Second half of a CRLF pair; the break is already written.
            if self.cr && byte == b'\n' {
                self.cr = false;
                return Ok(());
            }
            self.cr = byte == b'\r';
            self.escape_trailing_whitespace()?;
            return self.insert_crlf();
        }

        if self.len == MAX_LINE_LENGTH - 1 {
            self.insert_soft_break()?;
        }
        self.line[self.len] = byte;
        self.len += 1;
        self.cr = false;
        Ok(())
    }

    fn push_escaped(&mut self, byte: u8) -> io::Result<()> {
        if MAX_LINE_LENGTH - 1 - self.len < 3 {
            self.insert_soft_break()?;
        }
        self.line[self.len] = b'=';
        self.line[self.len + 1] = UPPER_HEX[usize::from(byte >> 4)];
        self.line[self.len + 2] = UPPER_HEX[usize::from(byte & 0x0f)];
        self.len += 3;
        Ok(())
    }

    /// Re-encodes a trailing space or tab so it survives transport.
    fn escape_trailing_whitespace(&mut self) -> io::Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        let last = self.line[self.len - 1];
        if last == b' ' || last == b'\t' {
            self.len -= 1;
            self.push_escaped(last)?;
        }
        Ok(())
    }

    fn insert_soft_break(&mut self) -> io::Result<()> {
        self.line[self.len] = b'=';
        self.len += 1;
        self.insert_crlf()
    }

    fn insert_crlf(&mut self) -> io::Result<()> {
        self.line[self.len] = b'\r';
        self.line[self.len + 1] = b'\n';
        self.len += 2;
        self.flush_line()
    }

    fn flush_line(&mut self) -> io::Result<()> {
        self.inner.write_all(&self.line[..self.len])?;
        self.len = 0;
        Ok(())
    }
}

impl<W: Write> Write for QuotedPrintableWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            match byte {
                b'!'..=b'<' | b'>'..=b'~' | b' ' | b'\t' | b'\r' | b'\n' => {
                    self.push_literal(byte)?;
                }
                _ => self.push_escaped(byte)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn encode_quoted_printable(data: &[u8]) -> String {
        let mut writer = QuotedPrintableWriter::new(Vec::new());
        writer.write_all(data).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    fn wrapped(data: &[u8]) -> String {
        let mut out = Vec::new();
        write_base64_wrapped(&mut out, data).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_base64_encode() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_base64_wrapped_empty() {
        assert_eq!(wrapped(b""), "");
    }

    #[test]
    fn test_base64_wrapped_exact_line() {
        // 57 bytes encode to exactly 76 characters.
        let out = wrapped(&[0xAB; 57]);
        assert_eq!(out.len(), 76);
        assert!(!out.contains("\r\n"));
    }

    #[test]
    fn test_base64_wrapped_one_past_line() {
        let out = wrapped(&[0x01; 58]);
        let lines: Vec<&str> = out.split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 76);
        assert_eq!(lines[1].len(), 4);
        assert!(!out.ends_with("\r\n"));
    }

    #[test]
    fn test_encode_word_ascii() {
        assert_eq!(encode_word("Hello", "UTF-8"), "=?UTF-8?B?SGVsbG8=?=");
    }

    #[test]
    fn test_encode_word_non_ascii() {
        assert_eq!(encode_word("Héllo", "UTF-8"), "=?UTF-8?B?SMOpbGxv?=");
    }

    #[test]
    fn test_encode_word_empty() {
        assert_eq!(encode_word("", "UTF-8"), "=?UTF-8?B??=");
    }

    #[test]
    fn test_quoted_printable_plain_ascii() {
        assert_eq!(encode_quoted_printable(b"Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_quoted_printable_utf8() {
        assert_eq!(encode_quoted_printable("Héllo".as_bytes()), "H=C3=A9llo");
    }

    #[test]
    fn test_quoted_printable_equals_sign() {
        assert_eq!(encode_quoted_printable(b"a=b"), "a=3Db");
    }

    #[test]
    fn test_quoted_printable_line_breaks_become_crlf() {
        assert_eq!(encode_quoted_printable(b"one\ntwo"), "one\r\ntwo");
        assert_eq!(encode_quoted_printable(b"one\r\ntwo"), "one\r\ntwo");
        assert_eq!(encode_quoted_printable(b"one\rtwo"), "one\r\ntwo");
    }

    #[test]
    fn test_quoted_printable_trailing_whitespace() {
        assert_eq!(encode_quoted_printable(b"end \r\nnext\t"), "end=20\r\nnext=09");
    }

    #[test]
    fn test_quoted_printable_whitespace_before_crlf() {
        assert_eq!(encode_quoted_printable(b"Hello \r\nWorld"), "Hello=20\r\nWorld");
        assert_eq!(encode_quoted_printable(b"a\t\r\n\r\nb"), "a=09\r\n\r\nb");
    }

    #[test]
    fn test_quoted_printable_inner_whitespace_kept() {
        assert_eq!(encode_quoted_printable(b"a b\tc"), "a b\tc");
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        let input = "x".repeat(100);
        let encoded = encode_quoted_printable(input.as_bytes());
        let lines: Vec<&str> = encoded.split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("{}=", "x".repeat(75)));
        assert_eq!(lines[1], "x".repeat(25));
    }

    #[test]
    fn test_quoted_printable_escape_not_split() {
        let input = format!("{}é", "x".repeat(73));
        let encoded = encode_quoted_printable(input.as_bytes());
        for line in encoded.split("\r\n") {
            assert!(line.len() <= MAX_LINE_LENGTH);
        }
        assert!(encoded.ends_with("=C3=A9"));
    }

    #[test]
    fn test_quoted_printable_control_bytes() {
        assert_eq!(encode_quoted_printable(&[0x00, 0x7f, b'a']), "=00=7Fa");
    }
}
