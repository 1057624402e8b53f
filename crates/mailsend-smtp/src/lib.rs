//! # mailsend-smtp
//!
//! An async SMTP submission client implementing the parts of RFC 5321 needed
//! to hand one message to a relay.
//!
//! ## Features
//!
//! - **Type-state connection management**: invalid command sequences do not
//!   compile
//! - **Transport security**: implicit TLS (port 465) and STARTTLS, verified
//!   against the webpki root store
//! - **Authentication**: AUTH PLAIN with an initial response
//! - **Data transfer**: line ending normalization and dot-stuffing of the
//!   message body
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsend_smtp::{Address, Client};
//! use mailsend_smtp::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> mailsend_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream).await?;
//!
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.starttls("smtp.example.com").await?;
//!     let client = client.auth_plain("user@example.com", "password").await?;
//!
//!     let client = client.mail_from(Address::new("sender@example.com")?).await?;
//!     let client = client.rcpt_to(Address::new("recipient@example.com")?).await?;
//!     let client = client.data().await?;
//!
//!     let client = client.send_message(b"Subject: Test\r\n\r\nHello\r\n").await?;
//!     client.quit().await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── auth_plain() ───→ Authenticated
//! └──────────────┘                             │
//!        │                                     │
//!        └─── mail_from() ──────┬──────────────┘
//!                               ↓
//!               MailTransaction ───→ RecipientAdded ───→ Data
//!                                                         │
//!              Connected ←──────── send_message() ────────┘
//! ```
//!
//! ## Modules
//!
//! - [`command`]: command and message data serialization
//! - [`connection`]: streams and the type-state client
//! - [`parser`]: reply parsing
//! - [`types`]: addresses, extensions, replies

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
    SmtpConnection,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
