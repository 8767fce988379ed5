//! Configurable lease timing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default lease timing for a secret type, loadable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseTiming {
    /// Lease duration, in seconds.
    pub duration_seconds: u64,
    /// Grace period after expiry, in seconds.
    pub grace_period_seconds: u64,
}

impl LeaseTiming {
    /// Default lease duration: one hour.
    pub const DEFAULT_DURATION_SECONDS: u64 = 3600;

    /// Returns the lease duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    /// Returns the grace period.
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_seconds)
    }

    /// Parses timing from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid JSON for this type.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization {
            reason: e.to_string(),
        })
    }

    /// Serializes timing to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization {
            reason: e.to_string(),
        })
    }
}

impl Default for LeaseTiming {
    fn default() -> Self {
        Self {
            duration_seconds: Self::DEFAULT_DURATION_SECONDS,
            grace_period_seconds: 0,
        }
    }
}
