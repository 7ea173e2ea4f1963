//! Timestamp type used throughout the ledger.
//!
//! Timestamps are Unix epoch seconds (UTC). Scheduling days are UTC calendar
//! days, so every node partitions time identically regardless of local zone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds in one scheduling day.
pub const SECS_PER_DAY: u64 = 86_400;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Current system time. A clock set before 1970 reads as the epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Index of the UTC day containing this timestamp.
    pub fn day_index(&self) -> u64 {
        self.0 / SECS_PER_DAY
    }

    /// Seconds since the start of this timestamp's UTC day.
    pub fn secs_into_day(&self) -> u64 {
        self.0 % SECS_PER_DAY
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 > self.0.saturating_add(duration_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
