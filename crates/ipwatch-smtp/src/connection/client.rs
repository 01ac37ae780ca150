//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::auth::Mechanism;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::marker::PhantomData;

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    ehlo_name: String,
    _state: PhantomData<State>,
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = ensure_success(read_reply(&mut stream).await?)?;

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(server = %hostname, "SMTP greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            ehlo_name: String::new(),
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        self.ehlo_name = client_hostname.to_string();
        self.send_ehlo().await?;
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, server_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        ensure_success(self.send_command(Command::StartTls).await?)?;
        self.stream = self.stream.upgrade_to_tls(server_hostname).await?;

        // Capabilities announced before the upgrade are discarded (RFC 3207)
        self.send_ehlo().await?;
        Ok(self)
    }

    /// Runs a SASL exchange with the given mechanism.
    ///
    /// Each 334 challenge is Base64-decoded and handed to the mechanism. If
    /// the mechanism rejects a challenge the exchange is cancelled with `*`
    /// and the mechanism's error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if the server advertises AUTH without
    /// this mechanism, [`Error::AuthFailed`] if the server rejects the
    /// exchange, or the mechanism's own error.
    pub async fn authenticate<M>(mut self, mechanism: &mut M) -> Result<Client<Authenticated>>
    where
        M: Mechanism + ?Sized,
    {
        let initial = mechanism.begin()?;

        let advertised = self.server_info.auth_mechanisms();
        if !advertised.is_empty() && !advertised.contains(&initial.mechanism) {
            return Err(Error::NotSupported(format!(
                "AUTH {}",
                initial.mechanism.as_str()
            )));
        }

        tracing::debug!(mechanism = initial.mechanism.as_str(), "starting SMTP authentication");
        let cmd = Command::Auth {
            mechanism: initial.mechanism,
            initial_response: initial.response.as_deref().map(encode_sasl),
        };
        let mut reply = self.send_command(cmd).await?;

        loop {
            if reply.code == ReplyCode::AUTH_CONTINUE {
                let challenge = decode_challenge(&reply)?;
                match mechanism.respond(&challenge, true) {
                    Ok(response) => {
                        let cmd = Command::AuthResponse(STANDARD.encode(response));
                        reply = self.send_command(cmd).await?;
                    }
                    Err(err) => {
                        self.cancel_auth().await;
                        return Err(err);
                    }
                }
            } else if reply.is_success() {
                mechanism.respond(&[], false)?;
                tracing::debug!("SMTP authentication succeeded");
                return Ok(self.into_state());
            } else {
                return Err(Error::AuthFailed {
                    code: reply.code.as_u16(),
                    message: reply.message_text(),
                });
            }
        }
    }

    /// Starts a mail transaction without authentication (if server allows).
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(self, from: &Address) -> Result<Client<MailTransaction>> {
        self.start_transaction(from).await
    }

    async fn send_ehlo(&mut self) -> Result<()> {
        let cmd = Command::Ehlo {
            hostname: self.ehlo_name.clone(),
        };
        let reply = ensure_success(self.send_command(cmd).await?)?;
        self.server_info.update_from_ehlo(&reply.message);
        Ok(())
    }

    async fn cancel_auth(&mut self) {
        match self.send_command(Command::AuthCancel).await {
            Ok(reply) => tracing::debug!(code = %reply.code, "SMTP authentication cancelled"),
            Err(err) => tracing::debug!(error = %err, "failed to cancel SMTP authentication"),
        }
    }
}

impl Client<Authenticated> {
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(self, from: &Address) -> Result<Client<MailTransaction>> {
        self.start_transaction(from).await
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: &Address) -> Result<Client<RecipientAdded>> {
        self.add_recipient(to).await?;
        Ok(self.into_state())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: &Address) -> Result<Self> {
        self.add_recipient(to).await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the DATA command fails.
    pub async fn data(mut self) -> Result<Client<Data>> {
        let reply = self.send_command(Command::Data).await?;

        if reply.code != ReplyCode::START_DATA {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }

        Ok(self.into_state())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, lines starting with `.` are
    /// dot-stuffed and the terminating `.` line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if sending the message fails or server rejects it.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Authenticated>> {
        self.stream.write_all(&dot_stuff(message)).await?;
        ensure_success(read_reply(&mut self.stream).await?)?;
        tracing::debug!(bytes = message.len(), "SMTP message accepted");

        Ok(self.into_state())
    }
}

// Common implementation for all states
impl<S> Client<S> {
    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;

        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }

        Ok(())
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::trace!(command = cmd.name(), "sending SMTP command");
        self.stream.write_all(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::trace!(command = cmd.name(), code = %reply.code, "SMTP reply");
        Ok(reply)
    }

    async fn start_transaction(mut self, from: &Address) -> Result<Client<MailTransaction>> {
        let cmd = Command::MailFrom { from: from.clone() };
        ensure_success(self.send_command(cmd).await?)?;
        Ok(self.into_state())
    }

    async fn add_recipient(&mut self, to: &Address) -> Result<()> {
        let cmd = Command::RcptTo { to: to.clone() };
        ensure_success(self.send_command(cmd).await?)?;
        Ok(())
    }

    fn into_state<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            ehlo_name: self.ehlo_name,
            _state: PhantomData,
        }
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);

        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}

fn ensure_success(reply: Reply) -> Result<Reply> {
    if reply.is_success() {
        Ok(reply)
    } else {
        Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()))
    }
}

/// Encodes a SASL response; an empty response is sent as `=` (RFC 4954).
fn encode_sasl(response: &[u8]) -> String {
    if response.is_empty() {
        "=".to_string()
    } else {
        STANDARD.encode(response)
    }
}

fn decode_challenge(reply: &Reply) -> Result<Vec<u8>> {
    let text = reply.message.first().map_or("", |line| line.trim());
    STANDARD
        .decode(text)
        .map_err(|e| Error::Protocol(format!("Invalid Base64 challenge {text:?}: {e}")))
}

/// Normalizes line endings to CRLF, dot-stuffs and terminates message data.
fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut lines: Vec<&[u8]> = message.split(|&b| b == b'\n').collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut out = Vec::with_capacity(message.len() + lines.len() + 5);
    for line in lines {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_stuff_normalizes_and_terminates() {
        assert_eq!(dot_stuff(b"a\nb\r\n"), b"a\r\nb\r\n.\r\n");
        assert_eq!(dot_stuff(b"a"), b"a\r\n.\r\n");
        assert_eq!(dot_stuff(b""), b".\r\n");
    }

    #[test]
    fn test_dot_stuff_escapes_leading_dots() {
        assert_eq!(dot_stuff(b".\r\n..x\r\n"), b"..\r\n...x\r\n.\r\n");
    }

    #[test]
    fn test_encode_sasl_empty() {
        assert_eq!(encode_sasl(b""), "=");
        assert_eq!(encode_sasl(b"user"), "dXNlcg==");
    }

    #[test]
    fn test_decode_challenge() {
        let reply = Reply::new(ReplyCode::AUTH_CONTINUE, vec!["VXNlcm5hbWU6".to_string()]);
        assert_eq!(decode_challenge(&reply).ok(), Some(b"Username:".to_vec()));

        let empty = Reply::new(ReplyCode::AUTH_CONTINUE, vec![String::new()]);
        assert_eq!(decode_challenge(&empty).ok(), Some(Vec::new()));

        let bad = Reply::new(ReplyCode::AUTH_CONTINUE, vec!["not base64!".to_string()]);
        assert!(matches!(decode_challenge(&bad), Err(Error::Protocol(_))));
    }
}
