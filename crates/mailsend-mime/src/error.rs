//! Error types for message assembly and encoding.

use std::io;
use std::path::PathBuf;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while emitting a message.
///
/// Any error invalidates the whole document, even if some bytes already
/// reached the sink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The message failed envelope validation; nothing was written.
    #[error("Invalid message: {0}")]
    Validation(#[from] ValidationError),

    /// An attachment could not be read.
    #[error("Failed to read attachment {}: {source}", .path.display())]
    AttachmentRead {
        /// Path as given to `add_attachment`.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Writing to the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Reasons a message is rejected before emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The recipient list is blank.
    #[error("\"To\" field is empty")]
    EmptyRecipients,
    /// The sender is blank.
    #[error("\"From\" field is empty")]
    EmptySender,
    /// The subject is blank.
    #[error("\"Subject\" field is empty")]
    EmptySubject,
    /// Both a plain-text and an HTML body were set.
    #[error("message can't have both plain text and html text")]
    ConflictingBodies,
}

impl ValidationError {
    /// Name of the field the error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyRecipients => "to",
            Self::EmptySender => "from",
            Self::EmptySubject => "subject",
            Self::ConflictingBodies => "body",
        }
    }
}

impl Error {
    /// Returns the validation failure, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<ValidationError> {
        match self {
            Self::Validation(err) => Some(*err),
            _ => None,
        }
    }
}
