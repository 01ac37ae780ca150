//! SMTP command builder.

use crate::types::{Address, AuthMechanism};

/// SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH - Begin authentication
    Auth {
        /// Authentication mechanism
        mechanism: AuthMechanism,
        /// Base64 initial response (SASL-IR)
        initial_response: Option<String>,
    },
    /// Base64 response line to a 334 challenge
    AuthResponse(String),
    /// `*` - abort the authentication exchange (RFC 4954)
    AuthCancel,
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: Address,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: Address,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Short name for logging; never includes credentials.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth { .. } => "AUTH",
            Self::AuthResponse(_) => "AUTH response",
            Self::AuthCancel => "AUTH cancel",
            Self::MailFrom { .. } => "MAIL FROM",
            Self::RcptTo { .. } => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }

    /// Serializes the command to bytes, including the trailing CRLF.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let line = match self {
            Self::Ehlo { hostname } => format!("EHLO {hostname}"),
            Self::StartTls => "STARTTLS".to_string(),
            Self::Auth {
                mechanism,
                initial_response: Some(resp),
            } => format!("AUTH {} {resp}", mechanism.as_str()),
            Self::Auth {
                mechanism,
                initial_response: None,
            } => format!("AUTH {}", mechanism.as_str()),
            Self::AuthResponse(resp) => resp.clone(),
            Self::AuthCancel => "*".to_string(),
            Self::MailFrom { from } => format!("MAIL FROM:<{from}>"),
            Self::RcptTo { to } => format!("RCPT TO:<{to}>"),
            Self::Data => "DATA".to_string(),
            Self::Quit => "QUIT".to_string(),
        };

        let mut buf = line.into_bytes();
        buf.extend_from_slice(b"\r\n");
        buf
    }
}
