//! Delivery services.
//!
//! [`deliver`] talks to any [`Session`]; [`SmtpSession`] is the one backed
//! by a real SMTP connection.

pub mod session;
pub mod smtp;

pub use session::{Session, deliver};
pub use smtp::{SmtpSession, connect_and_auth};
