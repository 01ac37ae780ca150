//! # ipwatch-smtp
//!
//! SMTP submission client (RFC 5321) used to deliver notifications.
//!
//! ## Features
//!
//! - **Type-state connection management**: Compile-time enforcement of valid
//!   SMTP state transitions
//! - **TLS support**: Both implicit TLS (port 465) and STARTTLS
//! - **Authentication**: SASL LOGIN and PLAIN through the [`Mechanism`] trait
//!
//! ## Quick Start
//!
//! ```ignore
//! use ipwatch_smtp::{Address, Client, LoginAuth};
//! use ipwatch_smtp::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("client.example.com").await?;
//!     let client = client.starttls("smtp.example.com").await?;
//!
//!     let mut auth = LoginAuth::new("user@example.com", "password");
//!     let client = client.authenticate(&mut auth).await?;
//!
//!     let from = Address::new("sender@example.com")?;
//!     let to = Address::new("recipient@example.com")?;
//!     let client = client.mail_from(&from).await?;
//!     let client = client.rcpt_to(&to).await?;
//!     let client = client.data().await?;
//!
//!     let client = client.send_message(b"Subject: Test\r\n\r\nHello\r\n").await?;
//!     client.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! Connected ─── authenticate() ───→ Authenticated
//!     │                                  │
//!     └──────────── mail_from() ─────────┴──→ MailTransaction
//!                                                  │ rcpt_to()
//!                                                  ▼
//!               Authenticated ←── send_message() ── Data ←── data() ── RecipientAdded
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use auth::{Initial, LoginAuth, LoginState, Mechanism, PlainAuth};
pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
