//! Transport configuration.
//!
//! | Variable      | Meaning                                              |
//! |---------------|------------------------------------------------------|
//! | `SMTP_HOST`   | relay hostname (required for delivery)               |
//! | `SMTP_PORT`   | relay port; missing or non-numeric means 465         |
//! | `SMTP_USER`   | AUTH PLAIN username, also the default sender         |
//! | `SMTP_PASS`   | AUTH PLAIN password                                  |
//! | `SMTP_SECURE` | `false` turns off STARTTLS on ports 25 and 587       |

use crate::error::{Error, Result};
use std::fmt;

/// Environment variable names.
pub mod env {
    /// Relay hostname.
    pub const HOST: &str = "SMTP_HOST";
    /// Relay port.
    pub const PORT: &str = "SMTP_PORT";
    /// Username.
    pub const USER: &str = "SMTP_USER";
    /// Password.
    pub const PASS: &str = "SMTP_PASS";
    /// STARTTLS switch for submission ports.
    pub const SECURE: &str = "SMTP_SECURE";
}

/// Security/encryption mode for the transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption (local relays only).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }

    /// Security mode implied by a port.
    ///
    /// Ports 25 and 587 upgrade with STARTTLS, or stay in plaintext when
    /// `upgrade` is false. Every other port uses implicit TLS.
    #[must_use]
    pub const fn for_port(port: u16, upgrade: bool) -> Self {
        match (port, upgrade) {
            (25 | 587, true) => Self::StartTls,
            (25 | 587, false) => Self::None,
            _ => Self::Tls,
        }
    }
}

/// SMTP relay configuration.
#[derive(Clone, Default)]
pub struct SmtpConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Username for authentication.
    pub username: Option<String>,
    /// Password for authentication.
    pub password: Option<String>,
}

impl SmtpConfig {
    /// Port used when `SMTP_PORT` is missing or not a number.
    pub const DEFAULT_PORT: u16 = 465;

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `SMTP_HOST` is missing or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `SMTP_HOST` is missing or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = non_blank(env::HOST)
            .ok_or_else(|| Error::Config(format!("{} is not set", env::HOST)))?;

        let port = match non_blank(env::PORT) {
            None => Self::DEFAULT_PORT,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid {}, using {}", env::PORT, Self::DEFAULT_PORT);
                Self::DEFAULT_PORT
            }),
        };

        let upgrade = !non_blank(env::SECURE).is_some_and(|value| {
            matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no")
        });

        Ok(Self {
            host,
            port,
            security: Security::for_port(port, upgrade),
            username: non_blank(env::USER),
            password: non_blank(env::PASS),
        })
    }

    /// Username and password, if both are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.username.as_deref()?, self.password.as_deref()?))
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<SmtpConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SmtpConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_host_required() {
        assert!(matches!(config(&[]), Err(Error::Config(_))));
        assert!(matches!(config(&[("SMTP_HOST", "  ")]), Err(Error::Config(_))));
    }

    #[test]
    fn test_port_defaults_to_implicit_tls() {
        let cfg = config(&[("SMTP_HOST", "smtp.example.com")]).unwrap();
        assert_eq!(cfg.host, "smtp.example.com");
        assert_eq!(cfg.port, 465);
        assert_eq!(cfg.security, Security::Tls);

        let cfg = config(&[("SMTP_HOST", "h"), ("SMTP_PORT", "abc")]).unwrap();
        assert_eq!(cfg.port, 465);
        assert_eq!(cfg.security, Security::Tls);
    }

    #[test]
    fn test_submission_ports_use_starttls() {
        for port in ["25", "587"] {
            let cfg = config(&[("SMTP_HOST", "h"), ("SMTP_PORT", port)]).unwrap();
            assert_eq!(cfg.security, Security::StartTls, "port {port}");
        }
        let cfg = config(&[("SMTP_HOST", "h"), ("SMTP_PORT", "2525")]).unwrap();
        assert_eq!(cfg.security, Security::Tls);
    }

    #[test]
    fn test_secure_false_only_affects_submission_ports() {
        let cfg = config(&[("SMTP_HOST", "h"), ("SMTP_PORT", "25"), ("SMTP_SECURE", "false")])
            .unwrap();
        assert_eq!(cfg.security, Security::None);

        let cfg = config(&[("SMTP_HOST", "h"), ("SMTP_PORT", "465"), ("SMTP_SECURE", "FALSE")])
            .unwrap();
        assert_eq!(cfg.security, Security::Tls);

        let cfg = config(&[("SMTP_HOST", "h"), ("SMTP_PORT", "587"), ("SMTP_SECURE", "true")])
            .unwrap();
        assert_eq!(cfg.security, Security::StartTls);
    }

    #[test]
    fn test_credentials_need_both() {
        let cfg = config(&[("SMTP_HOST", "h"), ("SMTP_USER", "me@example.com")]).unwrap();
        assert_eq!(cfg.credentials(), None);

        let cfg = config(&[
            ("SMTP_HOST", "h"),
            ("SMTP_USER", "me@example.com"),
            ("SMTP_PASS", "hunter2"),
        ])
        .unwrap();
        assert_eq!(cfg.credentials(), Some(("me@example.com", "hunter2")));
    }

    #[test]
    fn test_debug_redacts_password() {
        let cfg = SmtpConfig {
            host: "h".into(),
            password: Some("hunter2".into()),
            ..SmtpConfig::default()
        };
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
