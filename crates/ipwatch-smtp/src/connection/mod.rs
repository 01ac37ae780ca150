//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded};
pub use stream::{SmtpStream, connect, connect_tls};

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;

/// Server capabilities from the EHLO reply.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Supported extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Returns advertised authentication mechanisms; empty if none were.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn update_from_ehlo(&mut self, lines: &[String]) {
        // First line is the server greeting, the rest are keywords
        self.extensions = lines.iter().skip(1).map(|l| Extension::parse(l)).collect();
    }
}
