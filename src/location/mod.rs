//! Location source seam
//!
//! A source delivers zero or more [`LocationEvent`]s per active watch until
//! the watch is stopped. The monitor only reacts to delivered events.

pub mod replay;
pub mod track;

use serde::{Deserialize, Serialize};

use crate::domain::Position;
use crate::error::{LocationError, Result};

pub use replay::ReplaySource;
pub use track::{TrackPoint, load_track, parse_track};

/// What a location source delivers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LocationEvent {
    Update(Position),
    Error(LocationError),
}

/// Identifies one active watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WatchHandle(pub u64);

fn default_high_accuracy() -> bool {
    true
}
fn default_max_cached_age_ms() -> u64 {
    0
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_idle_interval_ms() -> u64 {
    5_000
}
fn default_monitor_interval_ms() -> u64 {
    2_000
}

/// Options passed to [`LocationSource::watch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    pub max_cached_age_ms: u64,
    pub timeout_ms: u64,
    /// Requested sampling cadence
    pub interval_ms: u64,
}

/// `[location]` table of the config file
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
    #[serde(default = "default_max_cached_age_ms")]
    pub max_cached_age_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Cadence of the always-on watch
    #[serde(default = "default_idle_interval_ms")]
    pub idle_interval_ms: u64,
    /// Cadence of the extra watch held while monitoring
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: default_high_accuracy(),
            max_cached_age_ms: default_max_cached_age_ms(),
            timeout_ms: default_timeout_ms(),
            idle_interval_ms: default_idle_interval_ms(),
            monitor_interval_ms: default_monitor_interval_ms(),
        }
    }
}

impl LocationConfig {
    pub fn idle_options(&self) -> WatchOptions {
        WatchOptions {
            high_accuracy: self.high_accuracy,
            max_cached_age_ms: self.max_cached_age_ms,
            timeout_ms: self.timeout_ms,
            interval_ms: self.idle_interval_ms,
        }
    }

    /// Monitoring always asks for high accuracy
    pub fn monitor_options(&self) -> WatchOptions {
        WatchOptions {
            high_accuracy: true,
            max_cached_age_ms: self.max_cached_age_ms,
            timeout_ms: self.timeout_ms,
            interval_ms: self.monitor_interval_ms,
        }
    }
}

/// Device location capability
pub trait LocationSource {
    /// Begin delivering events; fails with `UnsupportedEnvironment` when the
    /// host has no location capability at all
    fn watch(&mut self, options: WatchOptions) -> Result<WatchHandle>;

    /// Stop a watch. Unknown or already-stopped handles are ignored.
    fn stop_watching(&mut self, handle: WatchHandle);
}
