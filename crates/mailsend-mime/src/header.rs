//! MIME part headers.

use std::collections::BTreeMap;
use std::io::{self, Write};

/// Header block of a single MIME part.
///
/// Names are stored in canonical form (`content-type` becomes
/// `Content-Type`) and emitted in sorted order, so the serialized block does
/// not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: BTreeMap<String, String>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header value, replacing any existing one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(canonical_name(name), value.into());
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns an iterator over all headers in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Writes the header block followed by the blank separator line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (name, value) in self.iter() {
            write!(out, "{name}: {value}\r\n")?;
        }
        out.write_all(b"\r\n")
    }
}

/// Canonicalizes a header name (e.g., "content-type" -> "Content-Type").
fn canonical_name(name: &str) -> String {
    name.trim()
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
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

    #[test]
    fn test_headers_set_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.set("x-tag", "one");
        headers.set("X-TAG", "two");
        assert_eq!(headers.iter().collect::<Vec<_>>(), [("X-Tag", "two")]);
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("content-transfer-encoding"), "Content-Transfer-Encoding");
        assert_eq!(canonical_name("MIME-VERSION"), "Mime-Version");
    }

    #[test]
    fn test_headers_write_sorted() {
        let headers = Headers::new()
            .with("Content-Type", "text/plain; charset=utf-8")
            .with("Content-Transfer-Encoding", "quoted-printable");

        let mut out = Vec::new();
        headers.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Content-Transfer-Encoding: quoted-printable\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n"
        );
    }
}
