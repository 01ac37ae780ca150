//! Periodic public IP check.
//!
//! Every refresh period the watcher looks up the public address, compares it
//! with the previous lookup and, on a change, sends the notification on a
//! separate task. A failed lookup is logged and skipped until the next
//! period.

mod remote_ip;
mod tracker;

pub use remote_ip::{HttpIpFetcher, IpFetcher, RemoteIp};
pub use tracker::{IpChange, IpTracker, Observation};

use crate::config::Config;
use crate::mailer::Mailer;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Polls an [`IpFetcher`] and notifies through a [`Mailer`] on change.
#[derive(Debug)]
pub struct Watcher<F> {
    fetcher: F,
    tracker: IpTracker,
    mailer: Arc<Mailer>,
    refresh: Duration,
}

impl Watcher<HttpIpFetcher> {
    /// Creates a watcher querying the configured IP service.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            HttpIpFetcher::new(config.ip_service.as_str()),
            Mailer::new(config.email.clone()),
            config.refresh_interval(),
        )
    }
}

impl<F: IpFetcher> Watcher<F> {
    /// Creates a watcher.
    #[must_use]
    pub fn new(fetcher: F, mailer: Mailer, refresh: Duration) -> Self {
        Self {
            fetcher,
            tracker: IpTracker::new(),
            mailer: Arc::new(mailer),
            refresh,
        }
    }

    /// Change-detection state.
    #[must_use]
    pub const fn tracker(&self) -> &IpTracker {
        &self.tracker
    }

    /// Performs one lookup. Returns the change if the address moved.
    pub async fn tick(&mut self) -> Option<IpChange> {
        let current = match self.fetcher.fetch().await {
            Ok(ip) => ip,
            Err(err) => {
                tracing::warn!(error = %err, "couldn't get remote IP");
                return None;
            }
        };

        match self.tracker.observe(&current) {
            Observation::First => {
                tracing::info!(ip = %current.ip, "public IP baseline recorded");
                None
            }
            Observation::Unchanged => {
                tracing::debug!(ip = %current.ip, "public IP unchanged");
                None
            }
            Observation::Changed { previous } => {
                let change = IpChange {
                    previous,
                    current,
                    detected_at: Utc::now(),
                };
                tracing::info!(
                    previous = %change.previous.ip,
                    current = %change.current.ip,
                    at = %change.detected_at,
                    "public IP changed"
                );
                Some(change)
            }
        }
    }

    /// Sends the notification for `change` on a new task.
    ///
    /// Failures are logged; the returned handle is only needed to wait for
    /// completion.
    pub fn notify(&self, change: &IpChange) -> JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        let builder = mailer.notification(change);
        let ip = change.current.ip.clone();

        tokio::spawn(async move {
            if let Err(err) = mailer.send(builder).await {
                tracing::warn!(error = %err, ip = %ip, "e-mail wasn't sent");
            }
        })
    }

    /// Checks the public IP every refresh period, forever.
    ///
    /// The first check runs immediately and only records the baseline.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.refresh);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(every = ?self.refresh, "watching public IP");

        loop {
            interval.tick().await;
            if let Some(change) = self.tick().await {
                self.notify(&change);
            }
        }
    }
}
