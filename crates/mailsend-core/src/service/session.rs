//! Transport sessions and the delivery sequence.

use crate::error::Result;
use mailsend_mime::Message;
use std::io::Write;

/// A negotiated mail transport that accepts one message at a time.
///
/// Calls arrive in the order sender, recipients, body open, body close.
/// The body is finalized only by [`close_body_stream`](Self::close_body_stream);
/// dropping it without closing abandons the message.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Sink the message document is written into.
    type Body: Write;

    /// Declares the envelope sender.
    async fn set_envelope_sender(&mut self, from: &str) -> Result<()>;

    /// Adds one envelope recipient.
    async fn add_envelope_recipient(&mut self, to: &str) -> Result<()>;

    /// Starts the message body.
    async fn open_body_stream(&mut self) -> Result<Self::Body>;

    /// Finishes the message body and waits for the transport to accept it.
    async fn close_body_stream(&mut self, body: Self::Body) -> Result<()>;
}

/// Delivers `message` over an already-negotiated `session`.
///
/// The message is validated before the session is touched. Every recipient
/// from the `To` list is added in order and any rejection fails the send.
/// If emission fails the body is dropped without being closed, so the
/// transport never sees an end-of-data marker for a partial document.
///
/// Once the document has been written, a failure to close the body is
/// logged and the delivery still counts as sent.
///
/// # Errors
///
/// Returns [`Error::Message`](crate::Error::Message) for validation and
/// encoding failures, or whatever error the session reports before the
/// body is closed.
pub async fn deliver<S: Session>(message: &Message, session: &mut S) -> Result<()> {
    message.validate()?;

    session.set_envelope_sender(message.from()).await?;
    let recipients = message.recipients();
    for recipient in &recipients {
        session.add_envelope_recipient(recipient).await?;
    }

    let mut body = session.open_body_stream().await?;
    message.write_to(&mut body)?;

    match session.close_body_stream(body).await {
        Ok(()) => tracing::info!(recipients = recipients.len(), "message delivered"),
        Err(err) => tracing::error!(error = %err, "failed to finish message body"),
    }
    Ok(())
}
