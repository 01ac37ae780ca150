//! Notification delivery over SMTP.
//!
//! Glues message building, LOGIN authentication and the SMTP transport.

use crate::config::{EmailSettings, Security};
use crate::error::{Error, Result};
use crate::watcher::IpChange;
use ipwatch_mime::{Address, Message, MessageBuilder};
use ipwatch_smtp::connection::{connect, connect_tls};
use ipwatch_smtp::{Client, LoginAuth};
use tokio::sync::Mutex;

/// Name sent with EHLO.
const EHLO_NAME: &str = "localhost";

/// Sends messages with the configured sender, server and credentials.
///
/// Sends are serialized: a second call waits for the first to finish.
#[derive(Debug)]
pub struct Mailer {
    settings: EmailSettings,
    lock: Mutex<()>,
}

impl Mailer {
    /// Creates a mailer for the given settings.
    #[must_use]
    pub fn new(settings: EmailSettings) -> Self {
        Self {
            settings,
            lock: Mutex::new(()),
        }
    }

    /// Settings this mailer delivers with.
    #[must_use]
    pub const fn settings(&self) -> &EmailSettings {
        &self.settings
    }

    /// Builds the IP change notification for the configured recipients.
    #[must_use]
    pub fn notification(&self, change: &IpChange) -> MessageBuilder {
        let settings = &self.settings;
        let builder = Message::builder()
            .from(settings.sender.name.as_str(), settings.sender.email.as_str())
            .subject(settings.subject.as_str())
            .text_body(format!(
                "Your IP address has been changed to {}",
                change.current.ip
            ));

        settings
            .recipient_email
            .iter()
            .fold(builder, |builder, recipient| builder.to(recipient.as_str()))
    }

    /// Sends a message.
    ///
    /// The display name is taken from the builder (empty if its sender is
    /// unset or invalid); the address is always the configured sender.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compose`] if the message cannot be built,
    /// [`Error::Auth`] if the server rejects the credentials and
    /// [`Error::Transport`] for any other delivery failure.
    pub async fn send(&self, builder: MessageBuilder) -> Result<()> {
        let name = builder.sender_name().to_string();
        let message = builder
            .from(name, self.settings.sender.email.as_str())
            .build()?;
        let data = message.to_bytes()?;

        let recipients = message
            .recipients()
            .iter()
            .map(|r| Address::new(r.trim()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let _guard = self.lock.lock().await;
        self.deliver(&message.sender().address, &recipients, &data)
            .await?;

        tracing::info!(recipients = %message.recipients_joined(), "notification e-mail sent");
        Ok(())
    }

    async fn deliver(&self, from: &Address, recipients: &[Address], data: &[u8]) -> Result<()> {
        let Some((first, rest)) = recipients.split_first() else {
            return Err(Error::Compose(ipwatch_mime::Error::NoRecipients));
        };

        let smtp = &self.settings.smtp;
        let security = smtp.security();
        tracing::debug!(
            host = %smtp.hostname,
            port = smtp.port,
            security = security.display_name(),
            "connecting to SMTP server"
        );

        let stream = match security {
            Security::Tls => connect_tls(&smtp.hostname, smtp.port).await,
            Security::StartTls | Security::None => connect(&smtp.hostname, smtp.port).await,
        }
        .map_err(Error::Transport)?;

        let client = Client::from_stream(stream)
            .await
            .map_err(Error::Transport)?;
        let client = client.ehlo(EHLO_NAME).await.map_err(Error::Transport)?;

        let client = if security == Security::StartTls {
            client
                .starttls(&smtp.hostname)
                .await
                .map_err(Error::Transport)?
        } else {
            client
        };

        let mut auth = LoginAuth::new(
            self.settings.username.as_str(),
            self.settings.password.as_str(),
        );
        let client = client.authenticate(&mut auth).await.map_err(auth_error)?;

        let client = client.mail_from(from).await.map_err(Error::Transport)?;
        let mut client = client.rcpt_to(first).await.map_err(Error::Transport)?;
        for recipient in rest {
            client = client.rcpt_to(recipient).await.map_err(Error::Transport)?;
        }

        let client = client.data().await.map_err(Error::Transport)?;
        let client = client.send_message(data).await.map_err(Error::Transport)?;
        client.quit().await.map_err(Error::Transport)
    }
}

fn auth_error(err: ipwatch_smtp::Error) -> Error {
    if err.is_auth() || matches!(err, ipwatch_smtp::Error::NotSupported(_)) {
        Error::Auth(err)
    } else {
        Error::Transport(err)
    }
}
