//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::{Command, encode_data};
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Reply, ReplyCode};
use base64::Engine;
use std::marker::PhantomData;

/// Type-state marker: greeted, no transaction open.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker: authenticated, no transaction open.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker: MAIL FROM accepted.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker: at least one RCPT TO accepted.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker: DATA accepted, message content expected.
#[derive(Debug)]
pub struct Data;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Connected {}
    impl Sealed for super::Authenticated {}
}

/// States in which a mail transaction may be started.
pub trait MailReady: sealed::Sealed {}
impl MailReady for Connected {}
impl MailReady for Authenticated {}

/// Name announced in EHLO until [`Client::ehlo`] sets another.
const DEFAULT_LOCAL_NAME: &str = "localhost";

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    /// Our own name, repeated in every EHLO on this connection.
    local_name: String,
    _state: PhantomData<State>,
}

/// Connection trait for all states.
pub trait SmtpConnection {
    /// Returns the server information.
    fn server_info(&self) -> &ServerInfo;
}

impl<S> SmtpConnection for Client<S> {
    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or the server refuses
    /// the session.
    pub async fn from_stream(stream: SmtpStream) -> Result<Self> {
        let mut client = Self {
            stream,
            server_info: ServerInfo::default(),
            local_name: DEFAULT_LOCAL_NAME.to_string(),
            _state: PhantomData,
        };

        let greeting = client.read_reply().await?;
        if !greeting.is_success() {
            return Err(Error::from_reply(&greeting));
        }

        client.server_info.hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(server = %client.server_info.hostname, "greeting received");

        Ok(client)
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects EHLO.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        client_hostname.clone_into(&mut self.local_name);
        self.greet().await?;
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS and repeats EHLO over
    /// the encrypted channel.
    ///
    /// `server_name` is the relay's name, used for SNI and certificate
    /// verification. The repeated EHLO announces the same client name as
    /// the first one.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not offered, is rejected, or the TLS
    /// handshake fails.
    pub async fn starttls(mut self, server_name: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }
        self.expect_success(Command::StartTls).await?;

        self.stream = self.stream.upgrade_to_tls(server_name).await?;
        tracing::debug!(server_name, "connection upgraded to TLS");

        self.greet().await?;
        Ok(self)
    }

    async fn greet(&mut self) -> Result<()> {
        let command = self.ehlo_command();
        let reply = self.expect_success(command).await?;
        self.server_info.update_from_ehlo(&reply);
        Ok(())
    }

    fn ehlo_command(&self) -> Command {
        Command::Ehlo {
            hostname: self.local_name.clone(),
        }
    }

    /// Authenticates using the PLAIN mechanism with an initial response.
    ///
    /// # Errors
    ///
    /// Returns an error if the server advertised AUTH without PLAIN, or
    /// rejects the credentials.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        if self
            .server_info
            .auth_mechanisms()
            .is_some_and(|mechanisms| !mechanisms.contains(&AuthMechanism::Plain))
        {
            return Err(Error::NotSupported("AUTH PLAIN".into()));
        }

        let credentials = format!("\0{username}\0{password}");
        let initial_response =
            base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        self.expect_success(Command::AuthPlain { initial_response })
            .await?;
        tracing::debug!(username, "authenticated");
        Ok(self.transition())
    }
}

impl<S: MailReady> Client<S> {
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the sender.
    pub async fn mail_from(mut self, from: Address) -> Result<Client<MailTransaction>> {
        self.expect_success(Command::MailFrom { from }).await?;
        Ok(self.transition())
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the recipient.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded>> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self.transition())
    }

    /// Aborts the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSET command fails.
    pub async fn reset(self) -> Result<Client<Connected>> {
        self.rset().await
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the recipient.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 354.
    pub async fn data(mut self) -> Result<Client<Data>> {
        let reply = self.command(Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(Error::from_reply(&reply));
        }
        Ok(self.transition())
    }

    /// Aborts the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSET command fails.
    pub async fn reset(self) -> Result<Client<Connected>> {
        self.rset().await
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// The content is dot-stuffed, line endings are normalized to CRLF and
    /// the end-of-data line is appended (see [`encode_data`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] before anything is written if the
    /// server advertised a smaller SIZE, or an error if the server does not
    /// accept the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Connected>> {
        if let Some(limit) = self.server_info.max_message_size()
            && message.len() > limit
        {
            return Err(Error::MessageTooLarge {
                size: message.len(),
                limit,
            });
        }

        let data = encode_data(message);
        self.stream.write_all(&data).await?;
        tracing::debug!(bytes = data.len(), "message data sent");

        let reply = self.read_reply().await?;
        if !reply.is_success() {
            return Err(Error::from_reply(&reply));
        }
        tracing::debug!(reply = %reply.message_text(), "message accepted");
        Ok(self.transition())
    }
}

impl<S> Client<S> {
    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        self.expect_success(Command::Quit).await?;
        Ok(())
    }

    /// Returns true if the connection is encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        self.stream.is_tls()
    }

    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            local_name: self.local_name,
            _state: PhantomData,
        }
    }

    async fn rset(mut self) -> Result<Client<Connected>> {
        self.expect_success(Command::Rset).await?;
        Ok(self.transition())
    }

    async fn expect_success(&mut self, cmd: Command) -> Result<Reply> {
        let reply = self.command(cmd).await?;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(Error::from_reply(&reply))
        }
    }

    async fn command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::debug!(command = cmd.verb(), "sending command");
        self.stream.write_all(&cmd.serialize()).await?;

        let reply = self.read_reply().await?;
        tracing::debug!(command = cmd.verb(), code = reply.code.as_u16(), "reply");
        Ok(reply)
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = self.stream.read_line().await?;
            let is_last = is_last_reply_line(&line);
            lines.push(line);
            if is_last {
                break;
            }
        }
        parse_reply(&lines)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::connection::connect;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    /// Greets, answers one EHLO, then holds the socket open.
    async fn greeted_client() -> Client<Connected> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut reader = BufReader::new(read);
            write.write_all(b"220 relay.example.com ESMTP\r\n").await.unwrap();
            let mut line = String::new();
            while reader.read_line(&mut line).await.unwrap_or(0) > 0 {
                write
                    .write_all(b"250-relay.example.com\r\n250 STARTTLS\r\n")
                    .await
                    .unwrap();
                line.clear();
            }
        });

        let stream = connect("127.0.0.1", port).await.unwrap();
        Client::from_stream(stream).await.unwrap()
    }

    #[tokio::test]
    async fn test_ehlo_name_defaults_to_localhost() {
        let client = greeted_client().await;
        assert_eq!(client.ehlo_command().serialize(), b"EHLO localhost\r\n");
    }

    #[tokio::test]
    async fn test_ehlo_name_kept_for_repeat_greeting() {
        let client = greeted_client().await.ehlo("client.example.org").await.unwrap();
        assert!(client.server_info().supports_starttls());

        // STARTTLS repeats the greeting with this same command.
        assert_eq!(
            client.ehlo_command().serialize(),
            b"EHLO client.example.org\r\n"
        );
    }
}
