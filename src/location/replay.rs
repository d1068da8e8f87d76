use std::collections::BTreeMap;

use tracing::debug;

use super::{LocationSource, WatchHandle, WatchOptions};
use crate::error::{GeofenceError, Result};

/// Location source fed from a recorded timeline
///
/// It does not produce events itself; the scenario runner asks
/// [`ReplaySource::is_watching`] before delivering each recorded sample.
#[derive(Debug)]
pub struct ReplaySource {
    supported: bool,
    next_id: u64,
    watches: BTreeMap<WatchHandle, WatchOptions>,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self {
            supported: true,
            next_id: 1,
            watches: BTreeMap::new(),
        }
    }

    /// A host without any location capability
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn is_watching(&self) -> bool {
        !self.watches.is_empty()
    }

    pub fn active_watches(&self) -> impl Iterator<Item = (&WatchHandle, &WatchOptions)> {
        self.watches.iter()
    }

    /// Fastest cadence among active watches
    pub fn interval_ms(&self) -> Option<u64> {
        self.watches.values().map(|o| o.interval_ms).min()
    }
}

impl Default for ReplaySource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for ReplaySource {
    fn watch(&mut self, options: WatchOptions) -> Result<WatchHandle> {
        if !self.supported {
            return Err(GeofenceError::UnsupportedEnvironment);
        }
        let handle = WatchHandle(self.next_id);
        self.next_id += 1;
        self.watches.insert(handle, options);
        debug!(watch = handle.0, interval_ms = options.interval_ms, "watch started");
        Ok(handle)
    }

    fn stop_watching(&mut self, handle: WatchHandle) {
        if self.watches.remove(&handle).is_some() {
            debug!(watch = handle.0, "watch stopped");
        }
    }
}
