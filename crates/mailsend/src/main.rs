//! `mailsend` - compose a MIME email from the command line and send it over
//! SMTP.
//!
//! The message body is read from `--msg` or stdin. Relay settings come from
//! the `SMTP_*` environment variables (see `mailsend_core::config`).

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use mailsend_core::{SmtpConfig, connect_and_auth, deliver};
use mailsend_mime::Message;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "mailsend", version, about = "Compose a MIME email and send it over SMTP")]
struct Cli {
    /// Sender email address
    #[arg(long, env = "SMTP_USER", hide_env_values = true, default_value = "")]
    from: String,

    /// Destination email addresses (comma separated)
    #[arg(long, value_name = "ADDRS")]
    dests: String,

    /// Subject of the message
    #[arg(long)]
    sub: String,

    /// Message file [default: stdin]
    #[arg(long, value_name = "FILE")]
    msg: Option<PathBuf>,

    /// Attachments to send (comma separated)
    #[arg(long, value_name = "FILES", value_delimiter = ',')]
    atts: Vec<PathBuf>,

    /// Send the input as HTML, one paragraph per line
    #[arg(long)]
    html: bool,

    /// Print the message instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// More log output (repeat for trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbosity: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbosity).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let body = read_body(cli.msg.as_deref())?;
    let message = build_message(&cli, body);

    if cli.dry_run {
        let mut out = BufWriter::new(io::stdout().lock());
        message.write_to(&mut out).context("writing message")?;
        out.flush().context("writing message")?;
        return Ok(());
    }

    let config = SmtpConfig::from_env()?;
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?
        .block_on(send(&message, &config))
}

fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "mailsend=info,mailsend_core=info,mailsend_smtp=warn,mailsend_mime=warn",
        1 => "mailsend=debug,mailsend_core=debug,mailsend_smtp=debug,mailsend_mime=debug",
        _ => "mailsend=trace,mailsend_core=trace,mailsend_smtp=trace,mailsend_mime=trace",
    }
}

fn read_body(path: Option<&Path>) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    match path {
        Some(path) => File::open(path)
            .and_then(|mut file| file.read_to_end(&mut body))
            .with_context(|| format!("reading message file {}", path.display()))?,
        None => io::stdin()
            .lock()
            .read_to_end(&mut body)
            .context("reading message from stdin")?,
    };
    Ok(body)
}

fn build_message(cli: &Cli, body: Vec<u8>) -> Message {
    let mut message = Message::new();
    message
        .set_from(cli.from.as_str())
        .set_to(cli.dests.as_str())
        .set_subject(&cli.sub);

    if cli.html {
        message.set_html(html_paragraphs(&String::from_utf8_lossy(&body)));
    } else {
        message.set_plain_text(body);
    }

    for path in &cli.atts {
        message.add_attachment(path.as_path());
    }
    message
}

/// Wraps each input line in its own `<p>` element.
fn html_paragraphs(text: &str) -> String {
    format!("<p>{}</p>", text.replace('\n', "</p><p>"))
}

async fn send(message: &Message, config: &SmtpConfig) -> Result<()> {
    let mut session = connect_and_auth(config)
        .await
        .with_context(|| format!("connecting to {}:{}", config.host, config.port))?;

    deliver(message, &mut session)
        .await
        .context("sending message")?;
    info!(to = message.to(), "message sent");

    if let Err(err) = session.quit().await {
        tracing::warn!(error = %err, "QUIT failed after delivery");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mailsend").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_html_paragraphs() {
        assert_eq!(html_paragraphs("one"), "<p>one</p>");
        assert_eq!(html_paragraphs("one\ntwo"), "<p>one</p><p>two</p>");
        assert_eq!(html_paragraphs("one\n"), "<p>one</p><p></p>");
    }

    #[test]
    fn test_dests_and_sub_required() {
        assert!(Cli::try_parse_from(["mailsend", "--sub", "x"]).is_err());
        assert!(Cli::try_parse_from(["mailsend", "--dests", "a@x.com"]).is_err());
    }

    #[test]
    fn test_parse_flags() {
        let cli = parse(&[
            "--from",
            "me@example.com",
            "--dests",
            "a@x.com,b@x.com",
            "--sub",
            "Hi",
            "--atts",
            "a.pdf,b.png",
            "--html",
            "--dry-run",
        ]);
        assert_eq!(cli.from, "me@example.com");
        assert_eq!(cli.atts, [PathBuf::from("a.pdf"), PathBuf::from("b.png")]);
        assert!(cli.html);
        assert!(cli.dry_run);
        assert!(cli.msg.is_none());
    }

    #[test]
    fn test_build_plain_message() {
        let cli = parse(&["--from", "me@example.com", "--dests", "a@x.com", "--sub", "Hi"]);
        let message = build_message(&cli, b"line one\nline two".to_vec());

        assert_eq!(message.from(), "me@example.com");
        assert_eq!(message.recipients(), ["a@x.com"]);
        let out = String::from_utf8(message.to_bytes().unwrap()).unwrap();
        assert!(out.contains("Content-Type: text/plain; charset=utf-8"));
    }

    #[test]
    fn test_build_html_message() {
        let cli = parse(&[
            "--from", "me@example.com", "--dests", "a@x.com", "--sub", "Hi", "--html",
        ]);
        let message = build_message(&cli, b"one\ntwo".to_vec());

        let out = String::from_utf8(message.to_bytes().unwrap()).unwrap();
        assert!(out.contains("Content-Type: text/html; charset=utf-8\r\n\r\n<p>one</p><p>two</p>\r\n"));
        assert!(!out.contains("text/plain"));
    }
}
