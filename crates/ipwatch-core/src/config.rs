//! YAML configuration.
//!
//! ```yaml
//! refreshTime: 60
//! email:
//!   sender: { name: "Home server", email: "me@example.com" }
//!   subject: "IP changed"
//!   recipientEmail: ["ops@example.com"]
//!   smtp: { hostname: smtp.example.com, port: 587, encryption: true }
//!   username: me@example.com
//!   password: secret
//! ```
//!
//! Unknown keys (such as a `pop3` block) are ignored.

use crate::error::{Error, Result};
use ipwatch_mime::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Endpoint queried for the public IP when `ipService` is not set.
pub const DEFAULT_IP_SERVICE: &str = "https://api.myip.com";

/// Security/encryption mode for the SMTP connection.
///
/// Derived from [`SmtpSettings`] by [`SmtpSettings::security`]; it is never
/// read from the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Seconds between two IP checks.
    pub refresh_time: u64,
    /// Notification e-mail settings.
    pub email: EmailSettings,
    /// URL returning `{"ip": .., "country": .., "cc": ..}`.
    #[serde(default = "default_ip_service")]
    pub ip_service: String,
}

fn default_ip_service() -> String {
    DEFAULT_IP_SERVICE.to_string()
}

/// Who sends the notification, to whom, and through which server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSettings {
    /// Sender mailbox; the address is also the SMTP envelope sender.
    pub sender: Sender,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Recipients, each written to `To` and used as an envelope recipient.
    pub recipient_email: Vec<String>,
    /// Outgoing server.
    pub smtp: SmtpSettings,
    /// LOGIN username.
    pub username: String,
    /// LOGIN password.
    pub password: String,
}

/// Sender display name and address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sender {
    /// Display name, may be empty.
    #[serde(default)]
    pub name: String,
    /// E-mail address.
    pub email: String,
}

/// SMTP server location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    /// Server hostname.
    pub hostname: String,
    /// Server port.
    pub port: u16,
    /// Whether the connection must be encrypted.
    #[serde(default)]
    pub encryption: bool,
}

impl SmtpSettings {
    /// Connection security derived from `encryption` and the port: implicit
    /// TLS on 465, STARTTLS elsewhere, plaintext when encryption is off.
    #[must_use]
    pub const fn security(&self) -> Security {
        match (self.encryption, self.port) {
            (false, _) => Security::None,
            (true, 465) => Security::Tls,
            (true, _) => Security::StartTls,
        }
    }
}

impl Config {
    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file does not exist or is invalid,
    /// [`Error::Io`] if it cannot be read and [`Error::Yaml`] if it does not
    /// parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config("config file doesn't exist".into()));
        }

        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if the text does not parse and
    /// [`Error::Config`] if a value is invalid.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that the YAML layout alone cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_time == 0 {
            return Err(Error::Config("refreshTime must be greater than 0".into()));
        }
        if self.ip_service.trim().is_empty() {
            return Err(Error::Config("ipService cannot be empty".into()));
        }

        let email = &self.email;
        if email.recipient_email.is_empty() {
            return Err(Error::Config("at least one recipientEmail is required".into()));
        }
        if email.smtp.hostname.trim().is_empty() {
            return Err(Error::Config("smtp.hostname is required".into()));
        }
        if email.smtp.port == 0 {
            return Err(Error::Config("smtp.port must be 1-65535".into()));
        }
        Address::new(email.sender.email.as_str())
            .map_err(|e| Error::Config(format!("sender.email: {e}")))?;

        Ok(())
    }

    /// Interval between two IP checks.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_time)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
refreshTime: 60
email:
  sender:
    name: "Home server"
    email: me@example.com
  subject: IP changed
  recipientEmail:
    - ops@example.com
    - me@example.com
  smtp:
    hostname: smtp.example.com
    port: 587
    encryption: true
  pop3:
    hostname: pop.example.com
    port: 995
    encryption: true
  username: me@example.com
  password: secret
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.ip_service, DEFAULT_IP_SERVICE);
        assert_eq!(config.email.sender.name, "Home server");
        assert_eq!(config.email.recipient_email.len(), 2);
        assert_eq!(config.email.smtp.security(), Security::StartTls);
        assert_eq!(config.email.password, "secret");
    }

    #[test]
    fn test_security_mapping() {
        let smtp = |port, encryption| SmtpSettings {
            hostname: "smtp.example.com".into(),
            port,
            encryption,
        };
        assert_eq!(smtp(465, true).security(), Security::Tls);
        assert_eq!(smtp(587, true).security(), Security::StartTls);
        assert_eq!(smtp(25, false).security(), Security::None);
        assert_eq!(smtp(465, false).security(), Security::None);
    }

    #[test]
    fn test_validation_errors() {
        let zero_refresh = SAMPLE.replace("refreshTime: 60", "refreshTime: 0");
        assert!(matches!(
            Config::from_yaml_str(&zero_refresh),
            Err(Error::Config(_))
        ));

        let bad_sender = SAMPLE.replace("email: me@example.com", "email: not-an-address");
        assert!(matches!(
            Config::from_yaml_str(&bad_sender),
            Err(Error::Config(msg)) if msg.starts_with("sender.email")
        ));
    }

    #[test]
    fn test_missing_field_is_yaml_error() {
        assert!(matches!(
            Config::from_yaml_str("refreshTime: 60\n"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/ipwatch.yaml").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: config file doesn't exist");
    }

    #[test]
    fn test_ip_service_override() {
        let text = format!("{SAMPLE}ipService: http://127.0.0.1:8080/ip\n");
        let config = Config::from_yaml_str(&text).unwrap();
        assert_eq!(config.ip_service, "http://127.0.0.1:8080/ip");
    }
}
