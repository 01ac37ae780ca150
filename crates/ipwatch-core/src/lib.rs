//! # ipwatch-core
//!
//! Watches the machine's public IP address and e-mails the configured
//! recipients when it changes.
//!
//! This crate provides:
//! - YAML configuration ([`Config`])
//! - Notification delivery over SMTP with LOGIN authentication ([`Mailer`])
//! - Remote IP lookup and change detection ([`Watcher`])
//!
//! ```ignore
//! let config = ipwatch_core::Config::from_file("config.yaml")?;
//! ipwatch_core::Watcher::from_config(&config).run().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod mailer;
pub mod watcher;

pub use config::{Config, DEFAULT_IP_SERVICE, EmailSettings, Security, Sender, SmtpSettings};
pub use error::{Error, Result};
pub use mailer::Mailer;
pub use watcher::{
    HttpIpFetcher, IpChange, IpFetcher, IpTracker, Observation, RemoteIp, Watcher,
};
