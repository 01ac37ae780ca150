//! SASL mechanisms for the SMTP `AUTH` exchange.
//!
//! A [`Mechanism`] only turns server challenges into responses. Base64
//! framing, the 334/235 reply codes and aborting with `*` are handled by
//! [`Client::authenticate`](crate::Client::authenticate).

mod login;
mod plain;

pub use login::{LoginAuth, LoginState};
pub use plain::PlainAuth;

use crate::error::Result;
use crate::types::AuthMechanism;

/// First step of an exchange: the mechanism to announce and an optional
/// initial response sent with the `AUTH` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initial {
    /// Mechanism name sent with `AUTH`.
    pub mechanism: AuthMechanism,
    /// Raw (not yet Base64-encoded) initial response.
    pub response: Option<Vec<u8>>,
}

/// Client side of a SASL mechanism.
pub trait Mechanism {
    /// Starts the exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the mechanism cannot start.
    fn begin(&mut self) -> Result<Initial>;

    /// Answers a decoded server challenge.
    ///
    /// `more` is false once the server has accepted the exchange; the
    /// returned bytes are then not sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge cannot be answered; the exchange
    /// must then be aborted.
    fn respond(&mut self, challenge: &[u8], more: bool) -> Result<Vec<u8>>;
}
