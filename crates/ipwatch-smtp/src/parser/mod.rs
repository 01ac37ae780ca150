//! SMTP response parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from response lines.
///
/// SMTP replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// A bare code (`334`) is a line with empty text.
///
/// # Errors
///
/// Returns an error if the reply is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("Empty reply".into()))?;

    let code_str = first
        .get(0..3)
        .ok_or_else(|| Error::Protocol(format!("Reply too short: {first}")))?;
    let code = code_str
        .parse::<u16>()
        .map_err(|_| Error::Protocol(format!("Invalid reply code: {code_str}")))?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if !line.starts_with(code_str) {
            return Err(Error::Protocol(format!("Inconsistent reply line: {line}")));
        }
        match line.as_bytes().get(3) {
            None => message.push(String::new()),
            Some(b' ' | b'-') => message.push(line.get(4..).unwrap_or_default().to_string()),
            Some(_) => return Err(Error::Protocol(format!("Malformed reply line: {line}"))),
        }
    }

    Ok(Reply::new(ReplyCode::new(code), message))
}

/// Checks if a line is the last line of a reply.
///
/// Multi-line replies use `-` after the code for continuation lines; the
/// last line uses a space or ends right after the code.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.len() == 3 || (line.len() >= 4 && line.as_bytes()[3] == b' ')
}
