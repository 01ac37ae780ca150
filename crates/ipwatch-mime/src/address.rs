//! Mailbox and address types for message headers.

use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use std::fmt;

/// Bare e-mail address (`local@domain`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        if addr
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | ','))
        {
            return Err(Error::InvalidAddress(format!(
                "Address contains forbidden characters: {addr}"
            )));
        }

        let Some((local, domain)) = addr.split_once('@') else {
            return Err(Error::InvalidAddress(format!("Address must contain @: {addr}")));
        };

        if domain.contains('@') {
            return Err(Error::InvalidAddress(format!(
                "Address must have exactly one @: {addr}"
            )));
        }

        if local.is_empty() || domain.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "Local and domain parts cannot be empty: {addr}"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mailbox: optional display name plus address (RFC 5322 `mailbox`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name, empty when absent.
    pub name: String,
    /// E-mail address.
    pub address: Address,
}

impl Mailbox {
    /// Creates a mailbox from a display name and address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the name contains a
    /// line break.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.contains(['\r', '\n']) {
            return Err(Error::InvalidAddress(
                "Display name cannot contain line breaks".into(),
            ));
        }

        Ok(Self {
            name,
            address: Address::new(address)?,
        })
    }

    /// Parses a mailbox in one of the forms `"Name" <addr>`, `Name <addr>`,
    /// `<addr>` or `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid mailbox.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        let Some(open) = text.find('<') else {
            return Self::new("", text);
        };

        let address = text[open + 1..]
            .strip_suffix('>')
            .ok_or_else(|| Error::InvalidAddress(format!("Unterminated angle address: {text}")))?;

        let phrase = text[..open].trim();
        let name = match phrase
            .strip_prefix('"')
            .and_then(|p| p.strip_suffix('"'))
        {
            Some(quoted) => unescape_quoted(quoted),
            None if phrase.contains('"') => {
                return Err(Error::InvalidAddress(format!(
                    "Unbalanced quotes in display name: {text}"
                )));
            }
            None => phrase.to_string(),
        };

        Self::new(name, address)
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            return write!(f, "{}", self.address);
        }

        if self.name.is_ascii() {
            let escaped = self.name.replace('\\', "\\\\").replace('"', "\\\"");
            write!(f, "\"{escaped}\" <{}>", self.address)
        } else {
            write!(f, "{} <{}>", encode_rfc2047(&self.name), self.address)
        }
    }
}

fn unescape_quoted(quoted: &str) -> String {
    let mut name = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                name.push(escaped);
            }
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_address() {
        let addr = Address::new("user@example.com").unwrap();
        assert_eq!(addr.as_str(), "user@example.com");
    }

    #[test]
    fn test_invalid_addresses() {
        for bad in ["", "userexample.com", "@example.com", "user@", "a@b@c", "a b@c.d", "a@b.c\r\n"] {
            assert!(Address::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_mailbox_display_with_name() {
        let mailbox = Mailbox::new("Alice", "a@x.com").unwrap();
        assert_eq!(mailbox.to_string(), "\"Alice\" <a@x.com>");
    }

    #[test]
    fn test_mailbox_display_without_name() {
        let mailbox = Mailbox::new("", "a@x.com").unwrap();
        assert_eq!(mailbox.to_string(), "a@x.com");
    }

    #[test]
    fn test_mailbox_display_escapes_quotes() {
        let mailbox = Mailbox::new("Al \"the\" Ice", "a@x.com").unwrap();
        assert_eq!(mailbox.to_string(), "\"Al \\\"the\\\" Ice\" <a@x.com>");
    }

    #[test]
    fn test_mailbox_display_non_ascii_name() {
        let mailbox = Mailbox::new("Zoë", "z@x.com").unwrap();
        assert_eq!(mailbox.to_string(), "=?UTF-8?B?Wm/Dqw==?= <z@x.com>");
    }

    #[test]
    fn test_mailbox_name_rejects_line_breaks() {
        assert!(Mailbox::new("Eve\r\nBcc: x@y.z", "e@x.com").is_err());
    }

    #[test]
    fn test_parse_forms() {
        let quoted = Mailbox::parse("\"Alice\" <a@x.com>").unwrap();
        assert_eq!(quoted.name, "Alice");
        assert_eq!(quoted.address.as_str(), "a@x.com");

        let bare_name = Mailbox::parse("Bob Smith <b@y.com>").unwrap();
        assert_eq!(bare_name.name, "Bob Smith");

        let angle = Mailbox::parse("<c@z.com>").unwrap();
        assert_eq!(angle.name, "");
        assert_eq!(angle.address.as_str(), "c@z.com");

        let bare = Mailbox::parse(" d@w.com ").unwrap();
        assert_eq!(bare.address.as_str(), "d@w.com");
    }

    #[test]
    fn test_parse_display_roundtrip() {
        let mailbox = Mailbox::new("Al \"the\" Ice", "a@x.com").unwrap();
        assert_eq!(Mailbox::parse(&mailbox.to_string()).unwrap(), mailbox);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Mailbox::parse("Alice <a@x.com").is_err());
        assert!(Mailbox::parse("\"Alice <a@x.com>").is_err());
        assert!(Mailbox::parse("not an address").is_err());
    }
}
