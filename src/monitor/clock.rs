use std::collections::BTreeMap;
use std::time::Duration;

use super::countdown::{Timer, TimerHandle};

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    period: Duration,
    next_due: Duration,
}

/// Deterministic timer driven by explicit time advancement
///
/// Time starts at zero and only moves when the owner pops due ticks or calls
/// [`VirtualTimer::advance_to`]. Ticks come out in due order, ties broken by
/// handle.
#[derive(Debug, Default)]
pub struct VirtualTimer {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerHandle, Scheduled>,
}

impl VirtualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn active(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending tick
    pub fn next_due(&self) -> Option<(Duration, TimerHandle)> {
        self.timers
            .iter()
            .map(|(&handle, s)| (s.next_due, handle))
            .min()
    }

    /// Fire the earliest tick due at or before `until`, moving time to it
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, TimerHandle)> {
        let (due, handle) = self.next_due()?;
        if due > until {
            return None;
        }

        if let Some(scheduled) = self.timers.get_mut(&handle) {
            scheduled.next_due += scheduled.period;
        }
        self.now = self.now.max(due);
        Some((due, handle))
    }

    /// Move time to `until`, returning every tick fired on the way
    ///
    /// Cancellations made by the caller while handling the returned ticks do
    /// not retract them; use [`VirtualTimer::pop_due`] to interleave.
    pub fn advance_to(&mut self, until: Duration) -> Vec<(Duration, TimerHandle)> {
        let mut fired = Vec::new();
        while let Some(tick) = self.pop_due(until) {
            fired.push(tick);
        }
        self.now = self.now.max(until);
        fired
    }
}

impl Timer for VirtualTimer {
    fn start_repeating(&mut self, period: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        // A zero period would never let time advance
        let period = period.max(Duration::from_millis(1));
        self.timers.insert(
            handle,
            Scheduled {
                period,
                next_due: self.now + period,
            },
        );
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeating_ticks_in_order() {
        let mut timer = VirtualTimer::new();
        let slow = timer.start_repeating(Duration::from_secs(2));
        let fast = timer.start_repeating(Duration::from_secs(1));

        let fired = timer.advance_to(Duration::from_secs(4));
        let handles: Vec<_> = fired.iter().map(|&(_, h)| h).collect();

        assert_eq!(handles, vec![fast, slow, fast, fast, slow, fast]);
        assert_eq!(fired[1].0, Duration::from_secs(2));
        assert_eq!(timer.now(), Duration::from_secs(4));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timer = VirtualTimer::new();
        let handle = timer.start_repeating(Duration::from_secs(1));
        timer.cancel(handle);
        timer.cancel(handle);

        assert!(timer.advance_to(Duration::from_secs(60)).is_empty());
        assert_eq!(timer.active(), 0);
    }

    #[test]
    fn test_start_is_relative_to_now() {
        let mut timer = VirtualTimer::new();
        timer.advance_to(Duration::from_millis(2500));
        let handle = timer.start_repeating(Duration::from_secs(1));

        assert_eq!(
            timer.next_due(),
            Some((Duration::from_millis(3500), handle))
        );
        assert!(timer.pop_due(Duration::from_secs(3)).is_none());
    }
}
