//! # mailsend-core
//!
//! Delivery of composed messages for `mailsend`.
//!
//! This crate provides:
//! - The [`Session`] abstraction over a negotiated mail transport
//! - [`deliver`], which drives a session with the MIME encoder
//! - [`SmtpSession`], the session implementation over `mailsend-smtp`
//! - Transport configuration from `SMTP_*` environment variables

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod service;

pub use config::{Security, SmtpConfig};
pub use error::{Error, Result};
pub use service::{Session, SmtpSession, connect_and_auth, deliver};
