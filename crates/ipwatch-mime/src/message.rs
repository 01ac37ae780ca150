//! Message construction and multipart serialization.

use crate::address::Mailbox;
use crate::boundary::Boundary;
use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::header::{Headers, compose_message_headers};
use crate::part::{ContentEncoder, ContentPart, EncodedPart, FileAttachment, HtmlEncoding};
use rand::RngCore;
use rand::rngs::OsRng;
use std::io::{self, Write};

const BOUNDARY_ATTEMPTS: usize = 3;

/// Collects message fields before freezing them into a [`Message`].
///
/// Parts are kept in insertion order; nothing can be removed once added.
///
/// ```ignore
/// use ipwatch_mime::{FileAttachment, Message};
///
/// let message = Message::builder()
///     .from("Alice", "a@x.com")
///     .to("b@y.com")
///     .subject("Hi")
///     .text_body("hello")
///     .attach(FileAttachment::new("report.txt", "data123"))
///     .build()?;
/// let wire = message.to_bytes()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    sender: Option<std::result::Result<Mailbox, String>>,
    recipients: Vec<String>,
    subject: String,
    contents: Vec<ContentPart>,
    attachments: Vec<FileAttachment>,
    html_encoding: HtmlEncoding,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender from a display name (may be empty) and an address.
    #[must_use]
    pub fn from(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.sender = Some(Mailbox::new(name, address).map_err(|e| e.to_string()));
        self
    }

    /// Sets the sender from mailbox text such as `"Alice" <a@x.com>`.
    #[must_use]
    pub fn from_mailbox(mut self, mailbox: &str) -> Self {
        self.sender = Some(Mailbox::parse(mailbox).map_err(|e| e.to_string()));
        self
    }

    /// Appends a recipient. The string is written to `To` as given.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.recipients.push(recipient.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Appends a body variant.
    #[must_use]
    pub fn content(mut self, part: ContentPart) -> Self {
        self.contents.push(part);
        self
    }

    /// Appends a plain-text body variant.
    #[must_use]
    pub fn text_body(self, text: impl Into<Vec<u8>>) -> Self {
        self.content(ContentPart::plain(text))
    }

    /// Appends an HTML body variant.
    #[must_use]
    pub fn html_body(self, html: impl Into<Vec<u8>>) -> Self {
        self.content(ContentPart::html(html))
    }

    /// Appends a file attachment.
    #[must_use]
    pub fn attach(mut self, file: FileAttachment) -> Self {
        self.attachments.push(file);
        self
    }

    /// Selects how HTML variants are encoded.
    #[must_use]
    pub const fn html_encoding(mut self, html_encoding: HtmlEncoding) -> Self {
        self.html_encoding = html_encoding;
        self
    }

    /// Sender display name, or `""` when no valid sender is set.
    #[must_use]
    pub fn sender_name(&self) -> &str {
        match &self.sender {
            Some(Ok(mailbox)) => &mailbox.name,
            _ => "",
        }
    }

    /// Sender address, or `""` when no valid sender is set.
    #[must_use]
    pub fn sender_address(&self) -> &str {
        match &self.sender {
            Some(Ok(mailbox)) => mailbox.address.as_str(),
            _ => "",
        }
    }

    /// Freezes the builder into a [`Message`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSender`] if no sender was set,
    /// [`Error::InvalidAddress`] if the sender did not parse, and
    /// [`Error::NoRecipients`] if no recipient was added.
    pub fn build(self) -> Result<Message> {
        let sender = match self.sender {
            None => return Err(Error::MissingSender),
            Some(Err(reason)) => return Err(Error::InvalidAddress(reason)),
            Some(Ok(mailbox)) => mailbox,
        };

        if self.recipients.is_empty() {
            return Err(Error::NoRecipients);
        }

        Ok(Message {
            sender,
            recipients: self.recipients,
            subject: self.subject,
            contents: self.contents,
            attachments: self.attachments,
            encoder: ContentEncoder::new(self.html_encoding),
        })
    }
}

/// Immutable message ready for serialization.
///
/// Without attachments the body is a flat `multipart/alternative` of the
/// content parts. With attachments it is a `multipart/mixed` whose first part
/// is that `multipart/alternative`, followed by one part per attachment.
///
/// A message without content parts is accepted, but its
/// `multipart/alternative` holds no body parts: only the closing delimiter
/// is written. RFC 2046 requires at least one body part, so some receivers
/// reject such a message. Add a text or HTML variant for strict peers.
#[derive(Debug, Clone)]
pub struct Message {
    sender: Mailbox,
    recipients: Vec<String>,
    subject: String,
    contents: Vec<ContentPart>,
    attachments: Vec<FileAttachment>,
    encoder: ContentEncoder,
}

impl Message {
    /// Starts building a message.
    #[must_use]
    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    /// Sender mailbox.
    #[must_use]
    pub const fn sender(&self) -> &Mailbox {
        &self.sender
    }

    /// Recipients in insertion order.
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Recipients joined with `,`, as written to `To`.
    #[must_use]
    pub fn recipients_joined(&self) -> String {
        self.recipients.join(",")
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Body variants in insertion order.
    #[must_use]
    pub fn contents(&self) -> &[ContentPart] {
        &self.contents
    }

    /// Number of attached files.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// Returns true if any file is attached.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Serializes the message to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Entropy`] if no boundary could be generated.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&mut OsRng)
    }

    /// Serializes the message to bytes, drawing boundaries from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Entropy`] if `rng` cannot supply a boundary.
    pub fn to_bytes_with<R: RngCore + ?Sized>(&self, rng: &mut R) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_with(&mut buf, rng)?;
        Ok(buf)
    }

    /// Serializes the message as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or a passthrough HTML body is
    /// not valid UTF-8.
    pub fn to_text(&self) -> Result<String> {
        String::from_utf8(self.to_bytes()?).map_err(|e| Error::InvalidEncoding(e.to_string()))
    }

    /// Writes the serialized message to `w`.
    ///
    /// On error, whatever was already written to `w` is incomplete and must
    /// be discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if boundary generation or a write fails.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.write_to_with(w, &mut OsRng)
    }

    fn write_to_with<W, R>(&self, w: &mut W, rng: &mut R) -> Result<()>
    where
        W: Write + ?Sized,
        R: RngCore + ?Sized,
    {
        // Boundaries are drawn before anything is written
        let outer = Boundary::generate_with(rng)?;
        let inner = if self.has_attachments() {
            Some(distinct_boundary(rng, &outer)?)
        } else {
            None
        };

        compose_message_headers(&self.sender, &self.recipients, &self.subject).write_to(w)?;

        match inner {
            None => {
                write!(w, "Content-Type: {}\r\n\r\n", ContentType::multipart_alternative(&outer))?;
                self.write_alternative(w, &outer)?;
            }
            Some(inner) => {
                write!(w, "Content-Type: {}\r\n\r\n", ContentType::multipart_mixed(&outer))?;

                let mut mixed = MultipartWriter::new(w, &outer);
                let nested = Headers::new()
                    .with("Content-Type", ContentType::multipart_alternative(&inner).to_string());
                mixed.start_part(&nested)?;
                self.write_alternative(mixed.inner(), &inner)?;

                for file in &self.attachments {
                    mixed.part(&self.encoder.encode_attachment(file))?;
                }
                mixed.finish()?;
            }
        }

        w.flush()?;

        tracing::debug!(
            contents = self.contents.len(),
            attachments = self.attachments.len(),
            "Serialized message"
        );
        Ok(())
    }

    fn write_alternative<W: Write + ?Sized>(&self, w: &mut W, boundary: &Boundary) -> io::Result<()> {
        let mut alternative = MultipartWriter::new(w, boundary);
        for content in &self.contents {
            alternative.part(&self.encoder.encode_content(content))?;
        }
        alternative.finish()
    }
}

/// Draws a boundary different from `outer`.
///
/// A source that keeps repeating itself is not random, so after a few equal
/// draws this gives up with [`Error::Entropy`].
fn distinct_boundary<R: RngCore + ?Sized>(rng: &mut R, outer: &Boundary) -> Result<Boundary> {
    for _ in 0..BOUNDARY_ATTEMPTS {
        let boundary = Boundary::generate_with(rng)?;
        if boundary != *outer {
            return Ok(boundary);
        }
    }

    tracing::warn!("random source kept repeating the outer boundary");
    Err(Error::Entropy(rand::Error::new(
        "random source repeated the outer boundary",
    )))
}

/// Frames parts with a boundary delimiter (RFC 2046 §5.1.1).
///
/// The CRLF before each delimiter after the first belongs to the delimiter,
/// so part bodies are written without a trailing line break.
struct MultipartWriter<'a, W: Write + ?Sized> {
    w: &'a mut W,
    boundary: &'a Boundary,
    first: bool,
}

impl<'a, W: Write + ?Sized> MultipartWriter<'a, W> {
    fn new(w: &'a mut W, boundary: &'a Boundary) -> Self {
        Self {
            w,
            boundary,
            first: true,
        }
    }

    fn start_part(&mut self, headers: &Headers) -> io::Result<()> {
        if self.first {
            self.first = false;
        } else {
            self.w.write_all(b"\r\n")?;
        }
        write!(self.w, "--{}\r\n", self.boundary)?;
        headers.write_to(&mut *self.w)?;
        self.w.write_all(b"\r\n")
    }

    fn part(&mut self, part: &EncodedPart) -> io::Result<()> {
        self.start_part(&part.headers())?;
        self.w.write_all(&part.payload)
    }

    fn inner(&mut self) -> &mut W {
        &mut *self.w
    }

    fn finish(self) -> io::Result<()> {
        write!(self.w, "\r\n--{}--\r\n", self.boundary)
    }
}
