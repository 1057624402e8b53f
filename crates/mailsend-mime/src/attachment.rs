//! File attachments.

use crate::content_type::OCTET_STREAM;
use crate::encoding::write_base64_wrapped;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::multipart::MultipartWriter;
use crate::sniff::detect_content_type;
use std::io::Write;
use std::path::Path;

/// An attachment read into memory, ready to be framed as a part.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Base name used in `Content-Disposition`.
    pub filename: String,
    /// Resolved content type.
    pub content_type: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Reads the file at `path` and resolves its content type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttachmentRead`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| Error::AttachmentRead {
            path: path.to_path_buf(),
            source,
        })?;

        let content_type = resolve_content_type(path, &data);
        let filename = base_name(path);
        tracing::debug!(%filename, %content_type, size = data.len(), "loaded attachment");

        Ok(Self {
            filename,
            content_type,
            data,
        })
    }

    /// Part headers for this attachment.
    #[must_use]
    pub fn headers(&self) -> Headers {
        Headers::new()
            .with("Content-Type", self.content_type.as_str())
            .with("Content-Transfer-Encoding", "base64")
            .with(
                "Content-Disposition",
                format!("attachment; filename={}", quote(&self.filename)),
            )
    }

    /// Emits this attachment as one base64-encoded part of `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_part<W: Write>(&self, writer: &mut MultipartWriter<W>) -> Result<()> {
        let part = writer.create_part(&self.headers())?;
        write_base64_wrapped(part, &self.data)?;
        Ok(())
    }
}

/// Sniffs the content type, falling back to the file extension when the
/// content is not recognized.
#[must_use]
pub fn resolve_content_type(path: &Path, data: &[u8]) -> String {
    let sniffed = detect_content_type(data);
    if sniffed != OCTET_STREAM {
        return sniffed.to_string();
    }

    mime_guess::from_path(path)
        .first()
        .map_or_else(|| sniffed.to_string(), |mime| mime.to_string())
}

fn base_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Quotes a string for a header parameter, escaping quotes, backslashes and
/// control characters.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.extend(c.escape_unicode()),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name(Path::new("/tmp/reports/q3.pdf")), "q3.pdf");
        assert_eq!(base_name(Path::new("notes.txt")), "notes.txt");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("report.pdf"), "\"report.pdf\"");
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote("tab\there"), "\"tab\\there\"");
    }

    #[test]
    fn test_resolve_sniffed_wins() {
        // Sniffed as PNG even with a misleading extension.
        let data = b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0D";
        assert_eq!(resolve_content_type(Path::new("image.pdf"), data), "image/png");
    }

    #[test]
    fn test_resolve_falls_back_to_extension() {
        let data = [0x00, 0x01, 0x02, 0xFF];
        assert_eq!(
            resolve_content_type(Path::new("archive.tar"), &data),
            "application/x-tar"
        );
    }

    #[test]
    fn test_resolve_unknown_extension_keeps_fallback() {
        let data = [0x00, 0x01, 0x02, 0xFF];
        assert_eq!(
            resolve_content_type(Path::new("blob.zzzunknown"), &data),
            OCTET_STREAM
        );
        assert_eq!(resolve_content_type(Path::new("noext"), &data), OCTET_STREAM);
    }

    #[test]
    fn test_headers() {
        let attachment = Attachment {
            filename: "a.bin".to_string(),
            content_type: OCTET_STREAM.to_string(),
            data: vec![1, 2, 3],
        };
        assert_eq!(
            attachment.headers().to_string(),
            "Content-Disposition: attachment; filename=\"a.bin\"\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Type: application/octet-stream\r\n"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Attachment::load(Path::new("/nonexistent/definitely/missing.bin")).unwrap_err();
        match err {
            Error::AttachmentRead { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/definitely/missing.bin"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
