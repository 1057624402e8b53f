//! SMTP-backed delivery session.

use super::session::Session;
use crate::config::{Security, SmtpConfig};
use crate::error::Result;
use mailsend_smtp::connection::{connect, connect_tls};
use mailsend_smtp::{
    Address, Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded,
};

/// Name sent with EHLO.
const CLIENT_HOSTNAME: &str = "localhost";

/// Where the underlying type-state client currently is.
#[derive(Debug)]
enum Stage {
    Connected(Client<Connected>),
    Authenticated(Client<Authenticated>),
    Mail(Client<MailTransaction>),
    Recipients(Client<RecipientAdded>),
    Data(Client<Data>),
    /// A previous step failed or the session was consumed.
    Closed,
}

/// A [`Session`] over an SMTP connection.
///
/// The body is buffered in memory; closing it dot-stuffs the document,
/// sends the end-of-data line and waits for the server's reply.
#[derive(Debug)]
pub struct SmtpSession {
    stage: Stage,
}

impl SmtpSession {
    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not acknowledge QUIT.
    pub async fn quit(self) -> Result<()> {
        match self.stage {
            Stage::Connected(client) => client.quit().await?,
            Stage::Authenticated(client) => client.quit().await?,
            Stage::Mail(client) => client.quit().await?,
            Stage::Recipients(client) => client.quit().await?,
            Stage::Data(client) => client.quit().await?,
            Stage::Closed => {}
        }
        Ok(())
    }

    fn take(&mut self) -> Stage {
        std::mem::replace(&mut self.stage, Stage::Closed)
    }
}

impl From<Client<Connected>> for SmtpSession {
    fn from(client: Client<Connected>) -> Self {
        Self {
            stage: Stage::Connected(client),
        }
    }
}

impl From<Client<Authenticated>> for SmtpSession {
    fn from(client: Client<Authenticated>) -> Self {
        Self {
            stage: Stage::Authenticated(client),
        }
    }
}

impl Session for SmtpSession {
    type Body = Vec<u8>;

    async fn set_envelope_sender(&mut self, from: &str) -> Result<()> {
        let from = Address::new(envelope_address(from))?;
        let client = match self.take() {
            Stage::Connected(client) => client.mail_from(from).await?,
            Stage::Authenticated(client) => client.mail_from(from).await?,
            _ => return Err(out_of_order("MAIL FROM")),
        };
        self.stage = Stage::Mail(client);
        Ok(())
    }

    async fn add_envelope_recipient(&mut self, to: &str) -> Result<()> {
        let to = Address::new(envelope_address(to))?;
        let client = match self.take() {
            Stage::Mail(client) => client.rcpt_to(to).await?,
            Stage::Recipients(client) => client.rcpt_to(to).await?,
            _ => return Err(out_of_order("RCPT TO")),
        };
        self.stage = Stage::Recipients(client);
        Ok(())
    }

    async fn open_body_stream(&mut self) -> Result<Vec<u8>> {
        let Stage::Recipients(client) = self.take() else {
            return Err(out_of_order("DATA"));
        };
        self.stage = Stage::Data(client.data().await?);
        Ok(Vec::new())
    }

    async fn close_body_stream(&mut self, body: Vec<u8>) -> Result<()> {
        let Stage::Data(client) = self.take() else {
            return Err(out_of_order("end of data"));
        };
        self.stage = Stage::Connected(client.send_message(&body).await?);
        Ok(())
    }
}

/// Dials the relay described by `config`, greets it, secures the channel as
/// configured, and authenticates when both username and password are set.
///
/// # Errors
///
/// Returns a transport error if any step fails.
pub async fn connect_and_auth(config: &SmtpConfig) -> Result<SmtpSession> {
    tracing::debug!(
        host = %config.host,
        port = config.port,
        security = config.security.display_name(),
        "connecting to relay"
    );

    let stream = match config.security {
        Security::Tls => connect_tls(&config.host, config.port).await?,
        Security::StartTls | Security::None => connect(&config.host, config.port).await?,
    };

    let client = Client::from_stream(stream)
        .await?
        .ehlo(CLIENT_HOSTNAME)
        .await?;
    let client = if config.security == Security::StartTls {
        client.starttls(&config.host).await?
    } else {
        client
    };

    let Some((username, password)) = config.credentials() else {
        return Ok(client.into());
    };
    if !client.is_tls() {
        tracing::warn!("sending credentials over an unencrypted connection");
    }
    Ok(client.auth_plain(username, password).await?.into())
}

/// Extracts the addr-spec from `Name <addr>`, or returns the input trimmed.
fn envelope_address(value: &str) -> &str {
    let value = value.trim();
    match (value.rfind('<'), value.strip_suffix('>')) {
        (Some(open), Some(rest)) => &rest[open + 1..],
        _ => value,
    }
}

fn out_of_order(step: &str) -> crate::Error {
    mailsend_smtp::Error::Protocol(format!("{step} issued out of order")).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_address() {
        assert_eq!(envelope_address("a@x.com"), "a@x.com");
        assert_eq!(envelope_address("  a@x.com "), "a@x.com");
        assert_eq!(envelope_address("Alice <alice@x.com>"), "alice@x.com");
        assert_eq!(envelope_address("<bob@x.com>"), "bob@x.com");
        assert_eq!(envelope_address("broken <x"), "broken <x");
    }
}
