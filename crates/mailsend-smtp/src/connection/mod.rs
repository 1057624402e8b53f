//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{
    Authenticated, Client, Connected, Data, MailReady, MailTransaction, RecipientAdded,
    SmtpConnection,
};
pub use stream::{SmtpStream, connect, connect_tls};

use crate::types::{AuthMechanism, Extension, Reply};
use std::collections::HashSet;

/// What the server told us about itself.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the greeting.
    pub hostname: String,
    /// Extensions from the most recent EHLO.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Replaces the known extensions with those of an EHLO reply.
    ///
    /// The first reply line is the server's greeting and is skipped.
    pub fn update_from_ehlo(&mut self, reply: &Reply) {
        self.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
    }

    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Returns the maximum message size, if a non-zero limit was advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(Some(limit)) if *limit > 0 => Some(*limit),
            _ => None,
        })
    }

    /// Returns advertised authentication mechanisms, or `None` if the server
    /// did not advertise AUTH at all.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Option<&[AuthMechanism]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Auth(mechanisms) => Some(mechanisms.as_slice()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplyCode;

    fn ehlo(lines: &[&str]) -> ServerInfo {
        let reply = Reply::new(
            ReplyCode::OK,
            lines.iter().map(ToString::to_string).collect(),
        );
        let mut info = ServerInfo::default();
        info.update_from_ehlo(&reply);
        info
    }

    #[test]
    fn test_update_from_ehlo() {
        let info = ehlo(&[
            "mx.example.com Hello",
            "STARTTLS",
            "AUTH PLAIN LOGIN",
            "SIZE 1000",
        ]);
        assert!(info.supports_starttls());
        assert_eq!(info.max_message_size(), Some(1000));
        assert_eq!(
            info.auth_mechanisms(),
            Some(&[AuthMechanism::Plain, AuthMechanism::Login][..])
        );
    }

    #[test]
    fn test_greeting_line_skipped() {
        let info = ehlo(&["STARTTLS"]);
        assert!(!info.supports_starttls());
        assert_eq!(info.auth_mechanisms(), None);
    }

    #[test]
    fn test_size_zero_is_unlimited() {
        assert_eq!(ehlo(&["mx", "SIZE 0"]).max_message_size(), None);
        assert_eq!(ehlo(&["mx", "SIZE"]).max_message_size(), None);
    }
}
