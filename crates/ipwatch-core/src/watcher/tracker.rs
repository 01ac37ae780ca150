//! Change detection.

use super::RemoteIp;
use chrono::{DateTime, Utc};

/// Result of recording one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// First address seen; establishes the baseline.
    First,
    /// Same address as the previous lookup.
    Unchanged,
    /// Address differs from the previous lookup.
    Changed {
        /// Address before the change.
        previous: RemoteIp,
    },
}

/// A detected address change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpChange {
    /// Address before the change.
    pub previous: RemoteIp,
    /// Address after the change.
    pub current: RemoteIp,
    /// When the change was observed.
    pub detected_at: DateTime<Utc>,
}

/// Remembers the most recent public address.
///
/// Each lookup is compared with the one before it, so moving back to an
/// earlier address is reported like any other move.
#[derive(Debug, Clone, Default)]
pub struct IpTracker {
    current: Option<RemoteIp>,
}

impl IpTracker {
    /// Creates a tracker with no baseline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup and compares it with the previous one.
    ///
    /// Only the IP string is compared; a new country alone is not a change.
    pub fn observe(&mut self, ip: &RemoteIp) -> Observation {
        match self.current.replace(ip.clone()) {
            None => Observation::First,
            Some(previous) if previous.ip == ip.ip => Observation::Unchanged,
            Some(previous) => Observation::Changed { previous },
        }
    }

    /// Most recently observed address.
    #[must_use]
    pub const fn current(&self) -> Option<&RemoteIp> {
        self.current.as_ref()
    }
}
