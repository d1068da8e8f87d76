use serde::Serialize;
use std::time::Duration;

use tracing::trace;

/// Identifies one repeating timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerHandle(pub u64);

/// Repeating-timer capability
///
/// Fired timers are delivered back to the state machine as
/// `Event::Tick(handle)`.
pub trait Timer {
    fn start_repeating(&mut self, period: Duration) -> TimerHandle;

    /// Idempotent; unknown handles are ignored
    fn cancel(&mut self, handle: TimerHandle);
}

/// Outcome of delivering a tick to a [`Countdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// The tick belongs to a cancelled or replaced timer
    Stale,
    Remaining(u32),
    /// Reached zero; the timer has been torn down
    Expired,
}

/// Fixed-duration one-second countdown
///
/// The countdown only accepts ticks carrying its current handle. Clearing
/// the handle on cancel makes any tick queued before cancellation inert.
#[derive(Debug, Default)]
pub struct Countdown {
    handle: Option<TimerHandle>,
    remaining_secs: u32,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// (Re)start from `secs`, replacing any running timer
    pub fn start(&mut self, timer: &mut impl Timer, secs: u32) {
        self.cancel(timer);
        self.remaining_secs = secs;
        self.handle = Some(timer.start_repeating(Duration::from_secs(1)));
    }

    /// Returns whether a running timer was torn down
    pub fn cancel(&mut self, timer: &mut impl Timer) -> bool {
        match self.handle.take() {
            Some(handle) => {
                timer.cancel(handle);
                true
            }
            None => false,
        }
    }

    pub fn tick(&mut self, timer: &mut impl Timer, handle: TimerHandle) -> CountdownTick {
        if self.handle != Some(handle) {
            trace!(timer = handle.0, "ignoring stale tick");
            return CountdownTick::Stale;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.cancel(timer);
            CountdownTick::Expired
        } else {
            CountdownTick::Remaining(self.remaining_secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::VirtualTimer;

    #[test]
    fn test_counts_down_and_expires_once() {
        let mut timer = VirtualTimer::new();
        let mut countdown = Countdown::new();
        countdown.start(&mut timer, 3);

        let mut outcomes = Vec::new();
        while let Some((_, handle)) = timer.pop_due(Duration::from_secs(10)) {
            outcomes.push(countdown.tick(&mut timer, handle));
        }

        // The timer stops after expiry, so only three ticks were due
        assert_eq!(
            outcomes,
            vec![
                CountdownTick::Remaining(2),
                CountdownTick::Remaining(1),
                CountdownTick::Expired
            ]
        );
        assert!(!countdown.is_running());
        assert_eq!(timer.active(), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timer = VirtualTimer::new();
        let mut countdown = Countdown::new();

        assert!(!countdown.cancel(&mut timer));
        countdown.start(&mut timer, 30);
        assert!(countdown.cancel(&mut timer));
        assert!(!countdown.cancel(&mut timer));
        assert_eq!(timer.active(), 0);
    }

    #[test]
    fn test_tick_queued_before_cancel_is_stale() {
        let mut timer = VirtualTimer::new();
        let mut countdown = Countdown::new();
        countdown.start(&mut timer, 1);

        let queued = timer.advance_to(Duration::from_secs(1));
        assert_eq!(queued.len(), 1);

        countdown.cancel(&mut timer);
        assert_eq!(countdown.tick(&mut timer, queued[0].1), CountdownTick::Stale);
    }

    #[test]
    fn test_restart_replaces_timer() {
        let mut timer = VirtualTimer::new();
        let mut countdown = Countdown::new();
        countdown.start(&mut timer, 5);
        let first = timer.advance_to(Duration::from_secs(1));

        countdown.start(&mut timer, 5);
        assert_eq!(timer.active(), 1);
        assert_eq!(countdown.tick(&mut timer, first[0].1), CountdownTick::Stale);
        assert_eq!(countdown.remaining_secs(), 5);
    }
}
