//! Outgoing message builder and MIME emission.

use crate::attachment::Attachment;
use crate::content_type::ContentType;
use crate::encoding::{QuotedPrintableWriter, encode_word};
use crate::error::{Result, ValidationError};
use crate::header::Headers;
use crate::multipart::{MultipartWriter, generate_boundary};
use std::io::Write;
use std::path::PathBuf;

/// An outgoing email message.
///
/// Fields are set through chained setters in any order; nothing is validated
/// until the message is emitted with [`write_to`](Self::write_to).
///
/// ```ignore
/// use mailsend_mime::Message;
///
/// let mut message = Message::new();
/// message
///     .set_from("sender@example.com")
///     .set_to("alice@example.com,bob@example.com")
///     .set_subject("Quarterly report")
///     .set_plain_text("See attached.\r\n")
///     .add_attachment("report.pdf");
///
/// message.write_to(std::io::stdout().lock())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Message {
    from: String,
    to: String,
    subject: String,
    plain_text: Option<Vec<u8>>,
    html: Option<Vec<u8>>,
    attachments: Vec<PathBuf>,
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender address.
    pub fn set_from(&mut self, from: impl Into<String>) -> &mut Self {
        self.from = from.into();
        self
    }

    /// Sets the recipients as a comma-separated address list.
    pub fn set_to(&mut self, to: impl Into<String>) -> &mut Self {
        self.to = to.into();
        self
    }

    /// Sets the subject, storing it as a UTF-8 Base64 encoded-word.
    pub fn set_subject(&mut self, subject: &str) -> &mut Self {
        self.subject = encode_word(subject, "UTF-8");
        self
    }

    /// Sets the plain-text body.
    pub fn set_plain_text(&mut self, text: impl Into<Vec<u8>>) -> &mut Self {
        self.plain_text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    pub fn set_html(&mut self, html: impl Into<Vec<u8>>) -> &mut Self {
        self.html = Some(html.into());
        self
    }

    /// Appends an attachment path. The file is read at emission time.
    pub fn add_attachment(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.attachments.push(path.into());
        self
    }

    /// Sender address as set.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Recipient list as set (the `To` header value).
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Encoded subject (`=?UTF-8?B?...?=`).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Attachment paths in emission order.
    #[must_use]
    pub fn attachments(&self) -> &[PathBuf] {
        &self.attachments
    }

    /// Individual recipient addresses in order.
    ///
    /// The list is split on commas; surrounding whitespace is trimmed and
    /// empty entries are skipped.
    #[must_use]
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .collect()
    }

    /// Checks that the message can be emitted.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: blank recipients, sender or subject,
    /// or both body variants set.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.to.trim().is_empty() {
            return Err(ValidationError::EmptyRecipients);
        }
        if self.from.trim().is_empty() {
            return Err(ValidationError::EmptySender);
        }
        if self.subject.trim().is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        if self.plain_text.is_some() && self.html.is_some() {
            return Err(ValidationError::ConflictingBodies);
        }
        Ok(())
    }

    /// Serializes the message as a `multipart/mixed` document.
    ///
    /// Validation runs before the first byte is written. Attachments are read
    /// one at a time as they are emitted; a read failure aborts the emission
    /// and whatever reached `out` must be discarded.
    ///
    /// # Errors
    ///
    /// Returns a validation error, an attachment read error, or an I/O error
    /// from `out`.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        self.validate()?;

        let boundary = generate_boundary();
        out.write_all(b"MIME-Version: 1.0\r\n")?;
        write!(out, "From: {}\r\n", self.from)?;
        write!(out, "To: {}\r\n", self.to)?;
        write!(out, "Subject: {}\r\n", self.subject)?;
        write!(out, "Content-Type: {}\r\n", ContentType::multipart_mixed(boundary.as_str()))?;
        out.write_all(b"\r\n")?;

        let mut mixed = MultipartWriter::with_boundary(&mut out, boundary);

        let (alternative, alternative_boundary) = self.render_alternative()?;
        let headers = Headers::new().with(
            "Content-Type",
            ContentType::multipart_alternative(alternative_boundary).to_string(),
        );
        mixed.create_part(&headers)?.write_all(&alternative)?;

        for path in &self.attachments {
            Attachment::load(path)?.write_part(&mut mixed)?;
        }

        mixed.close()?;
        out.flush()?;

        tracing::debug!(
            recipients = self.recipients().len(),
            attachments = self.attachments.len(),
            "message emitted"
        );
        Ok(())
    }

    /// Serializes the message into a byte vector.
    ///
    /// # Errors
    ///
    /// Same as [`write_to`](Self::write_to).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Renders the complete `multipart/alternative` body into its own buffer.
    ///
    /// The inner container is closed before it is returned so it can be
    /// embedded as one opaque part of the outer container.
    fn render_alternative(&self) -> Result<(Vec<u8>, String)> {
        let mut alternative = MultipartWriter::new(Vec::new());

        let bodies = [
            (self.plain_text.as_deref(), ContentType::text_plain()),
            (self.html.as_deref(), ContentType::text_html()),
        ];
        for (body, content_type) in bodies {
            if let Some(body) = body.filter(|b| !b.is_empty()) {
                write_text_part(&mut alternative, &content_type, body)?;
            }
        }

        let boundary = alternative.boundary().to_string();
        Ok((alternative.close()?, boundary))
    }
}

fn write_text_part<W: Write>(
    writer: &mut MultipartWriter<W>,
    content_type: &ContentType,
    body: &[u8],
) -> Result<()> {
    let headers = Headers::new()
        .with("Content-Type", content_type.to_string())
        .with("Content-Transfer-Encoding", "quoted-printable");

    let part = writer.create_part(&headers)?;
    let mut encoder = QuotedPrintableWriter::new(part);
    encoder.write_all(body)?;
    encoder.finish()?;
    Ok(())
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
    use crate::error::Error;

    fn valid() -> Message {
        let mut message = Message::new();
        message
            .set_from("sender@example.com")
            .set_to("recipient@example.com")
            .set_subject("Hello");
        message
    }

    #[test]
    fn test_subject_always_encoded() {
        let message = valid();
        assert_eq!(message.subject(), "=?UTF-8?B?SGVsbG8=?=");
    }

    #[test]
    fn test_recipients_split() {
        let mut message = valid();
        message.set_to("a@x.com,b@x.com");
        assert_eq!(message.recipients(), vec!["a@x.com", "b@x.com"]);

        message.set_to("solo@x.com");
        assert_eq!(message.recipients(), vec!["solo@x.com"]);

        message.set_to(" a@x.com , ,b@x.com,");
        assert_eq!(message.recipients(), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_validate_blank_fields() {
        let mut message = valid();
        message.set_to("  ");
        assert_eq!(message.validate(), Err(ValidationError::EmptyRecipients));

        let mut message = valid();
        message.set_from("");
        assert_eq!(message.validate(), Err(ValidationError::EmptySender));

        let mut message = Message::new();
        message.set_from("a@x.com").set_to("b@x.com");
        assert_eq!(message.validate(), Err(ValidationError::EmptySubject));
    }

    #[test]
    fn test_validate_conflicting_bodies() {
        let mut message = valid();
        message.set_plain_text("text").set_html("<p>html</p>");
        assert_eq!(message.validate(), Err(ValidationError::ConflictingBodies));
    }

    #[test]
    fn test_setters_do_not_validate() {
        let mut message = Message::new();
        message.set_plain_text("a").set_html("b").add_attachment("/missing");
        assert_eq!(message.attachments().len(), 1);
    }

    #[test]
    fn test_write_rejects_before_writing() {
        let mut message = valid();
        message.set_plain_text("a").set_html("b");

        let mut out = Vec::new();
        let err = message.write_to(&mut out).unwrap_err();
        assert_eq!(err.as_validation(), Some(ValidationError::ConflictingBodies));
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_header_block() {
        let mut message = valid();
        message.set_plain_text("Hi");

        let out = String::from_utf8(message.to_bytes().unwrap()).unwrap();
        assert!(out.starts_with(
            "MIME-Version: 1.0\r\n\
             From: sender@example.com\r\n\
             To: recipient@example.com\r\n\
             Subject: =?UTF-8?B?SGVsbG8=?=\r\n\
             Content-Type: multipart/mixed; boundary="
        ));
    }

    #[test]
    fn test_write_plain_text_structure() {
        let mut message = valid();
        message.set_plain_text("Hi there");

        let out = String::from_utf8(message.to_bytes().unwrap()).unwrap();
        let (headers, body) = out.split_once("\r\n\r\n").unwrap();
        let outer = headers
            .lines()
            .find_map(|l| l.strip_prefix("Content-Type: multipart/mixed; boundary="))
            .unwrap();

        assert!(body.starts_with(&format!(
            "--{outer}\r\nContent-Type: multipart/alternative; boundary="
        )));
        assert!(body.contains(
            "Content-Transfer-Encoding: quoted-printable\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             Hi there\r\n--"
        ));
        assert!(body.ends_with(&format!("\r\n--{outer}--\r\n")));
        assert!(!body.contains("text/html"));
    }

    #[test]
    fn test_write_html_only() {
        let mut message = valid();
        message.set_html("<p>Hi</p>");

        let out = String::from_utf8(message.to_bytes().unwrap()).unwrap();
        assert!(out.contains("Content-Type: text/html; charset=utf-8\r\n\r\n<p>Hi</p>\r\n--"));
        assert!(!out.contains("text/plain"));
    }

    #[test]
    fn test_write_without_body() {
        let out = String::from_utf8(valid().to_bytes().unwrap()).unwrap();
        // The alternative container is still emitted, just empty.
        assert!(out.contains("Content-Type: multipart/alternative; boundary="));
        assert!(!out.contains("quoted-printable"));
    }

    #[test]
    fn test_write_missing_attachment() {
        let mut message = valid();
        message.set_plain_text("Hi").add_attachment("/nonexistent/file.bin");

        let err = message.to_bytes().unwrap_err();
        assert!(matches!(err, Error::AttachmentRead { .. }));
    }

    #[test]
    fn test_boundaries_fresh_per_emission() {
        let mut message = valid();
        message.set_plain_text("Hi");
        assert_ne!(message.to_bytes().unwrap(), message.to_bytes().unwrap());
    }
}
