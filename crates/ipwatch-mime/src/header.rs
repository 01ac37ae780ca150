//! Header blocks for messages and body parts.

use crate::address::Mailbox;
use std::fmt;
use std::io::{self, Write};

/// Ordered collection of header fields.
///
/// Fields are written in insertion order, one `Name: value` line each.
/// Values are written as given: no folding and no escaping, so callers must
/// not pass values containing CR or LF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Appends a header field, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// Gets the first value for a header (case-insensitive name).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over all fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Writes every field as a CRLF-terminated line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        for (name, value) in &self.fields {
            write!(w, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.fields {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

/// Composes the top-level header block: `From`, `To`, `Subject` and
/// `MIME-Version`, in that order.
///
/// `To` is the recipients joined with `,` exactly as supplied.
#[must_use]
pub fn compose_message_headers(sender: &Mailbox, recipients: &[String], subject: &str) -> Headers {
    Headers::new()
        .with("From", sender.to_string())
        .with("To", recipients.join(","))
        .with("Subject", subject)
        .with("MIME-Version", "1.0")
}
