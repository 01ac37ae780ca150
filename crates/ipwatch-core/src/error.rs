//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid YAML for the expected layout.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The message could not be built or serialized.
    #[error("Message composition failed: {0}")]
    Compose(#[from] ipwatch_mime::Error),

    /// The SMTP server did not accept the credentials.
    #[error("Authentication failed: {0}")]
    Auth(ipwatch_smtp::Error),

    /// Connecting to or talking with the SMTP server failed.
    #[error("SMTP transport error: {0}")]
    Transport(ipwatch_smtp::Error),

    /// The remote IP service could not be reached.
    #[error("Remote IP request failed: {0}")]
    RemoteIp(#[from] reqwest::Error),

    /// The remote IP service answered with an unexpected body.
    #[error("Couldn't parse remote IP: {0}")]
    RemoteIpParse(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
