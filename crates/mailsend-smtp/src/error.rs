//! Error types for SMTP operations.

use crate::types::Reply;
use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the underlying connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// The server answered with a non-success reply.
    #[error("SMTP error {code}: {message}")]
    Smtp {
        /// Reply code (e.g., 550).
        code: u16,
        /// Reply text, lines joined with `\n`.
        message: String,
    },

    /// The server sent something that is not a valid reply, or closed the
    /// connection.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Address rejected before it reached the wire.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Message is larger than the limit the server advertised with SIZE.
    #[error("Message exceeds size limit: {size} > {limit} bytes")]
    MessageTooLarge {
        /// Encoded message size.
        size: usize,
        /// Advertised limit.
        limit: usize,
    },

    /// Feature not offered by the server.
    #[error("Server does not support {0}")]
    NotSupported(String),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp(code: u16, message: impl Into<String>) -> Self {
        Self::Smtp {
            code,
            message: message.into(),
        }
    }

    /// Creates an SMTP error from a rejected reply.
    #[must_use]
    pub fn from_reply(reply: &Reply) -> Self {
        Self::smtp(reply.code.as_u16(), reply.message_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplyCode;

    #[test]
    fn test_from_reply() {
        let reply = Reply::new(
            ReplyCode::MAILBOX_UNAVAILABLE,
            vec!["5.1.1 No such user".to_string(), "Try again".to_string()],
        );
        let err = Error::from_reply(&reply);
        assert!(matches!(err, Error::Smtp { code: 550, .. }));
        assert_eq!(
            err.to_string(),
            "SMTP error 550: 5.1.1 No such user\nTry again"
        );
    }
}
