//! LOGIN mechanism.
//!
//! The server prompts with the literal texts `Username:` and `Password:`
//! (Base64-encoded on the wire). The username is also sent as the initial
//! response, so a server that honours it only asks for the password.

use super::{Initial, Mechanism};
use crate::error::{Error, Result};
use crate::types::AuthMechanism;
use std::fmt;

const USERNAME_PROMPT: &[u8] = b"Username:";
const PASSWORD_PROMPT: &[u8] = b"Password:";

/// Position in the LOGIN exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// `begin` has not been called.
    Start,
    /// Answering prompts.
    AwaitingChallenge,
    /// Server accepted the exchange.
    Done,
    /// An unrecognized prompt arrived; terminal.
    Failed,
}

/// LOGIN credentials and exchange state.
///
/// Each prompt is answered from its text alone, so the order in which the
/// server asks does not matter. Use one value per handshake.
#[derive(Clone)]
pub struct LoginAuth {
    username: String,
    password: String,
    state: LoginState,
}

impl LoginAuth {
    /// Creates a LOGIN mechanism for the given credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            state: LoginState::Start,
        }
    }

    /// Current exchange state.
    #[must_use]
    pub const fn state(&self) -> LoginState {
        self.state
    }
}

impl Mechanism for LoginAuth {
    fn begin(&mut self) -> Result<Initial> {
        self.state = LoginState::AwaitingChallenge;
        Ok(Initial {
            mechanism: AuthMechanism::Login,
            response: Some(self.username.as_bytes().to_vec()),
        })
    }

    fn respond(&mut self, challenge: &[u8], more: bool) -> Result<Vec<u8>> {
        if self.state == LoginState::Failed {
            return Err(Error::InvalidState("LOGIN exchange already failed".into()));
        }

        if !more {
            self.state = LoginState::Done;
            return Ok(Vec::new());
        }

        match challenge {
            USERNAME_PROMPT => Ok(self.username.as_bytes().to_vec()),
            PASSWORD_PROMPT => Ok(self.password.as_bytes().to_vec()),
            other => {
                self.state = LoginState::Failed;
                Err(Error::UnrecognizedChallenge(
                    String::from_utf8_lossy(other).into_owned(),
                ))
            }
        }
    }
}

impl fmt::Debug for LoginAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("state", &self.state)
            .finish()
    }
}
