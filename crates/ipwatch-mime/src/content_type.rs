//! MIME content type handling.

use crate::boundary::Boundary;
use crate::error::{Error, Result};
use std::fmt;

/// Content type used when a file extension is not in the table.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME content type with parameters in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=UTF-8, boundary=xxx).
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a new content type without parameters.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// `text/plain; charset=UTF-8`.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "UTF-8")
    }

    /// `text/html; charset=UTF-8`.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "UTF-8")
    }

    /// `multipart/mixed` with the given boundary.
    #[must_use]
    pub fn multipart_mixed(boundary: &Boundary) -> Self {
        Self::new("multipart", "mixed").with_parameter("boundary", boundary.as_str())
    }

    /// `multipart/alternative` with the given boundary.
    #[must_use]
    pub fn multipart_alternative(boundary: &Boundary) -> Self {
        Self::new("multipart", "alternative").with_parameter("boundary", boundary.as_str())
    }

    /// Resolves a content type from a file name's extension, falling back to
    /// `application/octet-stream` for unknown or missing extensions.
    #[must_use]
    pub fn from_filename(filename: &str) -> Self {
        mime_guess::from_path(filename)
            .first_raw()
            .and_then(|raw| Self::parse(raw).ok())
            .unwrap_or_else(Self::octet_stream)
    }

    /// `application/octet-stream`.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Adds a parameter, replacing an existing one with the same name.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(existing) => existing.1 = value,
            None => self.parameters.push((key, value)),
        }
        self
    }

    /// Returns a parameter value by case-insensitive name.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    /// Returns `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2="value 2"`
    ///
    /// # Errors
    ///
    /// Returns an error if the type or subtype is missing.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(';');

        let type_str = parts.next().unwrap_or_default().trim();
        let (main_type, sub_type) = type_str
            .split_once('/')
            .map(|(m, s)| (m.trim().to_lowercase(), s.trim().to_lowercase()))
            .filter(|(m, s)| !m.is_empty() && !s.is_empty())
            .ok_or_else(|| Error::InvalidEncoding(format!("Invalid content type: {s}")))?;

        let mut content_type = Self::new(main_type, sub_type);
        for param in parts {
            if let Some((key, value)) = param.trim().split_once('=') {
                content_type = content_type
                    .with_parameter(key.trim().to_lowercase(), value.trim().trim_matches('"'));
            }
        }

        Ok(content_type)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;

        for (key, value) in &self.parameters {
            // Quote value if it contains tspecials (RFC 2045)
            if value.is_empty()
                || value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c))
            {
                write!(f, "; {key}=\"{value}\"")?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        Ok(())
    }
}
