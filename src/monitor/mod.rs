//! Boundary-monitoring state machine
//!
//! Lifecycle: Idle → Drawing → Ready → Monitoring ⇄ Breached → Wiped, with
//! `reset` returning to Idle from anywhere. All events are processed to
//! completion, one at a time, by [`GeofenceApp::dispatch`].

pub mod clock;
pub mod countdown;
pub mod display;
pub mod machine;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Vertex;
use crate::location::{LocationConfig, LocationEvent};
use crate::view::Palette;

pub use clock::VirtualTimer;
pub use countdown::{Countdown, CountdownTick, Timer, TimerHandle};
pub use machine::{AppState, GeofenceApp};

/// Default minimum vertex count for a boundary
pub const MIN_VERTICES: usize = 3;
/// Default grace period between a breach and the wipe
pub const COUNTDOWN_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonitorState {
    #[default]
    Idle,
    Drawing,
    /// Boundary finalized, not yet monitoring
    Ready,
    Monitoring,
    /// Outside the boundary with the countdown running
    Breached { remaining_secs: u32 },
    /// Countdown expired. Only `reset` leaves this state.
    Wiped,
}

impl MonitorState {
    pub fn label(&self) -> &'static str {
        match self {
            MonitorState::Idle => "idle",
            MonitorState::Drawing => "drawing",
            MonitorState::Ready => "ready",
            MonitorState::Monitoring => "monitoring",
            MonitorState::Breached { .. } => "breached",
            MonitorState::Wiped => "wiped",
        }
    }

    pub fn is_monitoring(&self) -> bool {
        matches!(self, MonitorState::Monitoring | MonitorState::Breached { .. })
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Breached { remaining_secs } => {
                write!(f, "breached ({}s left)", remaining_secs)
            }
            other => f.write_str(other.label()),
        }
    }
}

/// The four buttons of the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    StartDrawing,
    FinishDrawing,
    StartMonitoring,
    Reset,
}

impl UserAction {
    pub fn label(&self) -> &'static str {
        match self {
            UserAction::StartDrawing => "Start Drawing",
            UserAction::FinishDrawing => "Finish Drawing",
            UserAction::StartMonitoring => "Start Monitoring",
            UserAction::Reset => "Reset",
        }
    }
}

/// Everything the state machine reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Action(UserAction),
    MapClicked(Vertex),
    Location(LocationEvent),
    Tick(TimerHandle),
}

/// Enabled flags for each button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub draw: bool,
    pub finish: bool,
    pub monitor: bool,
    pub reset: bool,
}

impl Controls {
    /// `location_supported` disables monitoring in draw-only mode
    pub fn for_state(state: MonitorState, location_supported: bool) -> Self {
        let (draw, finish, monitor) = match state {
            MonitorState::Idle => (true, false, false),
            MonitorState::Drawing => (false, true, false),
            MonitorState::Ready => (true, false, location_supported),
            MonitorState::Monitoring | MonitorState::Breached { .. } | MonitorState::Wiped => {
                (false, false, false)
            }
        };
        Self {
            draw,
            finish,
            monitor,
            reset: true,
        }
    }

    pub fn allows(&self, action: UserAction) -> bool {
        match action {
            UserAction::StartDrawing => self.draw,
            UserAction::FinishDrawing => self.finish,
            UserAction::StartMonitoring => self.monitor,
            UserAction::Reset => self.reset,
        }
    }
}

/// Messages the host should surface as pop-up alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "alert", content = "message", rename_all = "snake_case")]
pub enum Alert {
    Warning(String),
    Breach,
    /// Outside→Inside crossing; `wipe_cancelled` when a countdown was running
    ReEntered { wipe_cancelled: bool },
    Wiped,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::Warning(message) => f.write_str(message),
            Alert::Breach => {
                f.write_str("⚠️ Your device has left the boundary and will be wiped clean!")
            }
            Alert::ReEntered {
                wipe_cancelled: true,
            } => f.write_str("✅ Back inside the boundary - wipe cancelled"),
            Alert::ReEntered {
                wipe_cancelled: false,
            } => f.write_str("✅ Back inside the boundary"),
            Alert::Wiped => f.write_str("💀 Countdown expired - device wiped (simulated)"),
        }
    }
}

/// Tunables for [`GeofenceApp`]
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub min_vertices: usize,
    /// 0 wipes immediately on breach
    pub countdown_secs: u32,
    pub center: Vertex,
    pub zoom: u8,
    pub follow_zoom: u8,
    pub location: LocationConfig,
    pub palette: Palette,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            min_vertices: MIN_VERTICES,
            countdown_secs: COUNTDOWN_SECS,
            center: Vertex::raw(37.7749, -122.4194),
            zoom: 13,
            follow_zoom: 16,
            location: LocationConfig::default(),
            palette: Palette::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_per_state() {
        let idle = Controls::for_state(MonitorState::Idle, true);
        assert!(idle.draw && !idle.finish && !idle.monitor && idle.reset);

        let drawing = Controls::for_state(MonitorState::Drawing, true);
        assert!(!drawing.draw && drawing.finish && !drawing.monitor);

        let ready = Controls::for_state(MonitorState::Ready, true);
        assert!(ready.draw && !ready.finish && ready.monitor);

        let breached = Controls::for_state(MonitorState::Breached { remaining_secs: 4 }, true);
        assert!(!breached.draw && !breached.finish && !breached.monitor && breached.reset);
    }

    #[test]
    fn test_draw_only_mode_disables_monitoring() {
        let ready = Controls::for_state(MonitorState::Ready, false);
        assert!(ready.draw);
        assert!(!ready.allows(UserAction::StartMonitoring));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(MonitorState::Ready.to_string(), "ready");
        assert_eq!(
            MonitorState::Breached { remaining_secs: 12 }.to_string(),
            "breached (12s left)"
        );
    }

    #[test]
    fn test_reentry_alert_text() {
        let cancelled = Alert::ReEntered {
            wipe_cancelled: true,
        };
        let plain = Alert::ReEntered {
            wipe_cancelled: false,
        };
        assert!(cancelled.to_string().ends_with("wipe cancelled"));
        assert_eq!(plain.to_string(), "✅ Back inside the boundary");
    }

    #[test]
    fn test_user_action_names() {
        let action: UserAction = serde_json::from_str("\"start_monitoring\"").unwrap();
        assert_eq!(action, UserAction::StartMonitoring);
        assert_eq!(action.label(), "Start Monitoring");
    }
}
