//! Error types for MIME operations.

use std::io;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The secure random source could not supply a boundary.
    #[error("Entropy source unavailable: {0}")]
    Entropy(#[from] rand::Error),

    /// Sender or recipient is not a valid mailbox.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// No sender was set before building.
    #[error("Message has no sender")]
    MissingSender,

    /// No recipient was added before building.
    #[error("no recipient")]
    NoRecipients,

    /// Writing the serialized message failed.
    #[error("Write error: {0}")]
    Io(#[from] io::Error),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Invalid encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}
