//! Body variants, file attachments and their encoding into MIME parts.

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_wrapped, encode_quoted_printable, encoded_word};
use crate::header::Headers;
use std::fmt;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Header value for this encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How HTML body variants are put on the wire.
///
/// Both modes declare `Content-Transfer-Encoding: quoted-printable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HtmlEncoding {
    /// Apply Quoted-Printable to the markup, matching the declaration.
    #[default]
    QuotedPrintable,
    /// Emit the markup bytes untouched under the quoted-printable
    /// declaration. Reproduces the legacy notifier output byte for byte;
    /// markup containing `=` or non-ASCII text will be mis-decoded by
    /// receivers.
    Passthrough,
}

/// One rendering of the message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    is_html: bool,
    data: Vec<u8>,
}

impl ContentPart {
    /// Plain-text variant (UTF-8).
    #[must_use]
    pub fn plain(data: impl Into<Vec<u8>>) -> Self {
        Self {
            is_html: false,
            data: data.into(),
        }
    }

    /// HTML variant (UTF-8 markup).
    #[must_use]
    pub fn html(data: impl Into<Vec<u8>>) -> Self {
        Self {
            is_html: true,
            data: data.into(),
        }
    }

    /// Returns true for `text/html` variants.
    #[must_use]
    pub const fn is_html(&self) -> bool {
        self.is_html
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// File attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    name: String,
    data: Vec<u8>,
}

impl FileAttachment {
    /// Creates an attachment from a file name and its contents.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// File name, used for type lookup and the disposition filename.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw file bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A body variant or attachment ready to be framed into a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPart {
    /// Declared content type.
    pub content_type: ContentType,
    /// Declared transfer encoding.
    pub transfer_encoding: TransferEncoding,
    /// `Content-Disposition` value, for attachments.
    pub disposition: Option<String>,
    /// Encoded body bytes.
    pub payload: Vec<u8>,
}

impl EncodedPart {
    /// Part header block: `Content-Type`, `Content-Transfer-Encoding`, then
    /// `Content-Disposition` when present.
    #[must_use]
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new()
            .with("Content-Type", self.content_type.to_string())
            .with("Content-Transfer-Encoding", self.transfer_encoding.as_str());
        if let Some(disposition) = &self.disposition {
            headers.add("Content-Disposition", disposition.clone());
        }
        headers
    }
}

/// Chooses content type and transfer encoding for parts and produces their
/// payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentEncoder {
    html: HtmlEncoding,
}

impl ContentEncoder {
    /// Creates an encoder with the given HTML handling.
    #[must_use]
    pub const fn new(html: HtmlEncoding) -> Self {
        Self { html }
    }

    /// Encodes a body variant.
    ///
    /// Plain text is Base64; HTML is declared quoted-printable and encoded
    /// according to [`HtmlEncoding`].
    #[must_use]
    pub fn encode_content(&self, part: &ContentPart) -> EncodedPart {
        if !part.is_html() {
            return EncodedPart {
                content_type: ContentType::text_plain(),
                transfer_encoding: TransferEncoding::Base64,
                disposition: None,
                payload: encode_base64_wrapped(part.data()).into_bytes(),
            };
        }

        let payload = match self.html {
            HtmlEncoding::QuotedPrintable => encode_quoted_printable(part.data()).into_bytes(),
            HtmlEncoding::Passthrough => part.data().to_vec(),
        };

        EncodedPart {
            content_type: ContentType::text_html(),
            transfer_encoding: TransferEncoding::QuotedPrintable,
            disposition: None,
            payload,
        }
    }

    /// Encodes a file attachment as Base64 with a type looked up from the
    /// file extension and an encoded-word filename.
    #[must_use]
    pub fn encode_attachment(&self, file: &FileAttachment) -> EncodedPart {
        EncodedPart {
            content_type: ContentType::from_filename(file.name()),
            transfer_encoding: TransferEncoding::Base64,
            disposition: Some(format!("attachment; filename={}", encoded_word(file.name()))),
            payload: encode_base64_wrapped(file.data()).into_bytes(),
        }
    }
}
