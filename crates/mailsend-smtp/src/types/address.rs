//! Envelope addresses.

use crate::error::{Error, Result};

/// Email address for the SMTP envelope (`MAIL FROM` / `RCPT TO`).
///
/// Only checks what would break the command line: exactly one `@` with a
/// non-empty local part and domain, and no whitespace, angle brackets or
/// control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is malformed.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        let invalid = |reason: &str| Err(Error::InvalidAddress(format!("{addr:?}: {reason}")));

        if addr.is_empty() {
            return invalid("address cannot be empty");
        }
        if addr
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>')
        {
            return invalid("address contains forbidden characters");
        }

        match addr.split_once('@') {
            None => invalid("address must contain @"),
            Some((_, domain)) if domain.contains('@') => invalid("address must have exactly one @"),
            Some((local, domain)) if local.is_empty() || domain.is_empty() => {
                invalid("local and domain parts cannot be empty")
            }
            Some(_) => Ok(()),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
