//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur while configuring or delivering a message.
#[derive(Debug, Error)]
pub enum Error {
    /// The message could not be validated or encoded.
    #[error(transparent)]
    Message(#[from] mailsend_mime::Error),

    /// The transport session failed.
    #[error("SMTP error: {0}")]
    Transport(#[from] mailsend_smtp::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<mailsend_mime::ValidationError> for Error {
    fn from(err: mailsend_mime::ValidationError) -> Self {
        Self::Message(err.into())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
