//! # mailsend-mime
//!
//! Multipart MIME assembly for outgoing email.
//!
//! ## Features
//!
//! - **Message builder**: sender, recipients, subject, plain-text or HTML
//!   body, and file attachments, validated once at emission time
//! - **Nested multipart**: `multipart/mixed` wrapping a
//!   `multipart/alternative` body part
//! - **Encoding**: Quoted-Printable bodies, 76-column Base64 attachments,
//!   RFC 2047 encoded-word subjects
//! - **Content sniffing**: attachment types from leading bytes, with a file
//!   extension fallback
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsend_mime::Message;
//!
//! let mut message = Message::new();
//! message
//!     .set_from("sender@example.com")
//!     .set_to("recipient@example.com")
//!     .set_subject("Test Message")
//!     .set_plain_text("Hello, World!")
//!     .add_attachment("document.pdf");
//!
//! let bytes = message.to_bytes()?;
//! ```
//!
//! ## Document Layout
//!
//! ```text
//! MIME-Version / From / To / Subject
//! Content-Type: multipart/mixed; boundary=B1
//! ├── multipart/alternative; boundary=B2
//! │   ├── text/plain  (quoted-printable)
//! │   └── text/html   (quoted-printable)
//! ├── attachment 1    (base64)
//! └── attachment N    (base64)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachment;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;
pub mod multipart;
pub mod sniff;

pub use attachment::{Attachment, resolve_content_type};
pub use content_type::{ContentType, OCTET_STREAM};
pub use error::{Error, Result, ValidationError};
pub use header::Headers;
pub use message::Message;
pub use multipart::MultipartWriter;
