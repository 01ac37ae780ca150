//! Transfer and header encodings.
//!
//! Base64 bodies, Quoted-Printable bodies and RFC 2047 encoded-words.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum encoded line length for body encodings (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as a single line of standard Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as standard Base64 split into CRLF-separated lines of at
/// most [`MAX_LINE_LENGTH`] characters.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut wrapped = String::with_capacity(encoded.len() + 2 * (encoded.len() / MAX_LINE_LENGTH));

    for (i, line) in encoded.as_bytes().chunks(MAX_LINE_LENGTH).enumerate() {
        if i > 0 {
            wrapped.push_str("\r\n");
        }
        // The Base64 alphabet is ASCII, so every chunk is valid UTF-8.
        wrapped.push_str(std::str::from_utf8(line).unwrap_or_default());
    }

    wrapped
}

/// Decodes Base64 data, ignoring line breaks and other whitespace.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input (LF or CRLF) become hard CRLF breaks; longer
/// lines are split with soft breaks so no output line exceeds
/// [`MAX_LINE_LENGTH`].
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len() + data.len() / 2);
    let mut lines = data.split(|&b| b == b'\n').peekable();

    while let Some(line) = lines.next() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let mut line_length = 0;

        for (i, &byte) in line.iter().enumerate() {
            let at_line_end = i + 1 == line.len();
            // Whitespace is only safe when something follows it on the line
            let literal = matches!(byte, b'!'..=b'<' | b'>'..=b'~')
                || (matches!(byte, b' ' | b'\t') && !at_line_end);
            let width = if literal { 1 } else { 3 };

            // Leave room for the '=' of a soft line break
            if line_length + width > MAX_LINE_LENGTH - 1 {
                result.push_str("=\r\n");
                line_length = 0;
            }

            if literal {
                result.push(byte as char);
            } else {
                let _ = write!(result, "={byte:02X}");
            }
            line_length += width;
        }

        if lines.peek().is_some() {
            result.push_str("\r\n");
        }
    }

    result
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(text.len());
    let mut bytes = text.bytes().peekable();

    while let Some(byte) = bytes.next() {
        if byte != b'=' {
            result.push(byte);
            continue;
        }

        // Soft line break
        if bytes.peek() == Some(&b'\r') {
            bytes.next();
        }
        if bytes.peek() == Some(&b'\n') {
            bytes.next();
            continue;
        }

        let hex: Vec<u8> = bytes.by_ref().take(2).collect();
        let decoded = std::str::from_utf8(&hex)
            .ok()
            .filter(|h| h.len() == 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| {
                Error::InvalidEncoding(format!(
                    "Invalid escape sequence: ={}",
                    String::from_utf8_lossy(&hex)
                ))
            })?;
        result.push(decoded);
    }

    Ok(result)
}

/// Wraps text in a UTF-8 Base64 encoded-word (`=?UTF-8?B?...?=`, RFC 2047),
/// whether or not the text needs it.
#[must_use]
pub fn encoded_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", encode_base64(text.as_bytes()))
}

/// Encodes a header phrase as an RFC 2047 encoded-word only when it
/// contains characters that cannot appear in it literally.
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return text.to_string();
    }

    encoded_word(text)
}
