//! # ipwatch-mime
//!
//! MIME message generation for e-mail notifications.
//!
//! ## Features
//!
//! - **Multipart layout**: `multipart/alternative` for body variants,
//!   `multipart/mixed` wrapping it when files are attached
//! - **Boundaries**: 60 hex characters from the OS random source
//! - **Encodings**: Base64 text and attachments, Quoted-Printable HTML,
//!   RFC 2047 encoded-words for filenames and display names
//! - **Attachment types**: resolved from the file extension
//!
//! ## Quick Start
//!
//! ```ignore
//! use ipwatch_mime::Message;
//!
//! let message = Message::builder()
//!     .from("Alice", "a@x.com")
//!     .to("b@y.com")
//!     .to("c@z.com")
//!     .subject("Hi")
//!     .text_body("hello")
//!     .html_body("<p>hello</p>")
//!     .build()?;
//!
//! let wire = message.to_bytes()?; // hand to the SMTP DATA command
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod boundary;
mod content_type;
mod error;
mod header;
mod message;
mod part;

pub mod encoding;

pub use address::{Address, Mailbox};
pub use boundary::Boundary;
pub use content_type::{ContentType, OCTET_STREAM};
pub use error::{Error, Result};
pub use header::{Headers, compose_message_headers};
pub use message::{Message, MessageBuilder};
pub use part::{
    ContentEncoder, ContentPart, EncodedPart, FileAttachment, HtmlEncoding, TransferEncoding,
};
