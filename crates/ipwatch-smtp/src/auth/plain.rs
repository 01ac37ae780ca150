//! PLAIN mechanism (RFC 4616).

use super::{Initial, Mechanism};
use crate::error::{Error, Result};
use crate::types::AuthMechanism;
use std::fmt;

/// PLAIN credentials, sent in full as the initial response
/// (`\0<username>\0<password>`).
#[derive(Clone)]
pub struct PlainAuth {
    username: String,
    password: String,
}

impl PlainAuth {
    /// Creates a PLAIN mechanism for the given credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Mechanism for PlainAuth {
    fn begin(&mut self) -> Result<Initial> {
        // Empty authorization identity: act as the authentication identity
        let response = format!("\0{}\0{}", self.username, self.password).into_bytes();
        Ok(Initial {
            mechanism: AuthMechanism::Plain,
            response: Some(response),
        })
    }

    fn respond(&mut self, challenge: &[u8], more: bool) -> Result<Vec<u8>> {
        if more {
            return Err(Error::UnrecognizedChallenge(
                String::from_utf8_lossy(challenge).into_owned(),
            ));
        }
        Ok(Vec::new())
    }
}

impl fmt::Debug for PlainAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_response_format() {
        let initial = PlainAuth::new("user", "pass").begin().unwrap();
        assert_eq!(initial.mechanism, AuthMechanism::Plain);
        assert_eq!(initial.response.as_deref(), Some(&b"\0user\0pass"[..]));
    }

    #[test]
    fn test_challenge_is_rejected() {
        let mut auth = PlainAuth::new("user", "pass");
        assert!(matches!(
            auth.respond(b"more?", true),
            Err(Error::UnrecognizedChallenge(_))
        ));
        assert!(auth.respond(b"", false).unwrap().is_empty());
    }
}
