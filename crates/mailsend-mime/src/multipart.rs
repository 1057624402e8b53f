//! Multipart body framing (RFC 2046 §5.1).

use crate::header::Headers;
use rand::Rng;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Number of random bytes behind a boundary token.
const BOUNDARY_BYTES: usize = 30;

/// Generates a fresh boundary token: 60 lowercase hex characters.
#[must_use]
pub fn generate_boundary() -> String {
    let bytes: [u8; BOUNDARY_BYTES] = rand::thread_rng().r#gen();
    bytes.iter().fold(String::with_capacity(BOUNDARY_BYTES * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Writes the parts of one multipart container.
///
/// Each call to [`create_part`](Self::create_part) emits the delimiter and the
/// part headers and hands back the sink for the part body. The container is
/// only complete once [`close`](Self::close) has written the closing
/// delimiter. Writers for different nesting levels must not be interleaved on
/// one stream: render the inner container to its own buffer and close it
/// before embedding it as a single part.
///
/// Boundary collisions with part content are not detected.
#[derive(Debug)]
pub struct MultipartWriter<W: Write> {
    inner: W,
    boundary: String,
    has_parts: bool,
}

impl<W: Write> MultipartWriter<W> {
    /// Creates a writer with a freshly generated boundary.
    pub fn new(inner: W) -> Self {
        Self::with_boundary(inner, generate_boundary())
    }

    /// Creates a writer using the given boundary.
    pub const fn with_boundary(inner: W, boundary: String) -> Self {
        Self {
            inner,
            boundary,
            has_parts: false,
        }
    }

    /// Returns the boundary token of this container.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Starts a new part and returns the sink for its body.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the delimiter or headers fails.
    pub fn create_part(&mut self, headers: &Headers) -> io::Result<&mut W> {
        if self.has_parts {
            write!(self.inner, "\r\n--{}\r\n", self.boundary)?;
        } else {
            write!(self.inner, "--{}\r\n", self.boundary)?;
        }
        self.has_parts = true;

        headers.write_to(&mut self.inner)?;
        Ok(&mut self.inner)
    }

    /// Writes the closing delimiter and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the delimiter fails.
    pub fn close(mut self) -> io::Result<W> {
        if self.has_parts {
            write!(self.inner, "\r\n--{}--\r\n", self.boundary)?;
        } else {
            write!(self.inner, "--{}--\r\n", self.boundary)?;
        }
        Ok(self.inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_boundary_shape() {
        let boundary = generate_boundary();
        assert_eq!(boundary.len(), 60);
        assert!(boundary.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_boundary_unique() {
        assert_ne!(generate_boundary(), generate_boundary());
    }

    #[test]
    fn test_empty_container() {
        let writer = MultipartWriter::with_boundary(Vec::new(), "b".to_string());
        let out = writer.close().unwrap();
        assert_eq!(out, b"--b--\r\n");
    }

    #[test]
    fn test_two_parts() {
        let mut writer = MultipartWriter::with_boundary(Vec::new(), "XYZ".to_string());

        let part = writer
            .create_part(&Headers::new().with("Content-Type", "text/plain"))
            .unwrap();
        part.write_all(b"first").unwrap();

        let part = writer.create_part(&Headers::new()).unwrap();
        part.write_all(b"second").unwrap();

        let out = writer.close().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "--XYZ\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             first\r\n\
             --XYZ\r\n\
             \r\n\
             second\r\n\
             --XYZ--\r\n"
        );
    }
}
