use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tracing::trace;

use super::{Scenario, Step, StepKind, offset};
use crate::domain::Vertex;
use crate::location::{LocationEvent, ReplaySource};
use crate::monitor::{Alert, Event, GeofenceApp, MonitorSettings, MonitorState, VirtualTimer};
use crate::view::MapView;

/// One observable change during a replay
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    /// Seconds since the session started
    pub at: f64,
    pub event: String,
    #[serde(flatten)]
    pub state: MonitorState,
    pub status: String,
    pub coords: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Single-threaded event loop replaying a [`Scenario`]
///
/// Steps and countdown ticks are queued on one channel and drained into the
/// state machine in time order; ticks due at or before a step run first.
pub struct Runner<V> {
    app: GeofenceApp<V, ReplaySource, VirtualTimer>,
    sender: Sender<(Duration, Event)>,
    receiver: Receiver<(Duration, Event)>,
    clock: Duration,
    transcript: Vec<TranscriptEntry>,
}

impl<V: MapView> Runner<V> {
    pub fn new(scenario: &Scenario, settings: MonitorSettings, view: V) -> Self {
        let source = if scenario.geolocation {
            ReplaySource::new()
        } else {
            ReplaySource::unsupported()
        };
        let (sender, receiver) = mpsc::channel();

        let mut runner = Self {
            app: GeofenceApp::new(settings, view, source, VirtualTimer::new()),
            sender,
            receiver,
            clock: Duration::ZERO,
            transcript: Vec::new(),
        };
        runner.app.start();
        let alerts = runner.app.take_alerts();
        runner.record("start".to_string(), alerts, None);
        runner
    }

    pub fn app(&self) -> &GeofenceApp<V, ReplaySource, VirtualTimer> {
        &self.app
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn into_app(self) -> GeofenceApp<V, ReplaySource, VirtualTimer> {
        self.app
    }

    /// Replay every step, then let the clock run to the scenario's end
    ///
    /// `pace` receives the virtual time elapsed before each event; pass a
    /// no-op for instant replay.
    pub fn run_all(&mut self, scenario: &Scenario, mut pace: impl FnMut(Duration)) {
        for step in &scenario.steps {
            self.step(step, &mut pace);
        }
        let end = scenario.end_time(self.app.settings().countdown_secs);
        self.run_until(secs(end), &mut pace);
        self.app.shutdown();
    }

    pub fn step(&mut self, step: &Step, pace: &mut impl FnMut(Duration)) {
        let at = secs(step.at);
        self.run_until(at, pace);

        let event = match step.kind {
            StepKind::Action(action) => Some(Event::Action(action)),
            StepKind::Click([lat, lng]) => Some(Event::MapClicked(Vertex::raw(lat, lng))),
            StepKind::Position(position) => {
                self.watched(Event::Location(LocationEvent::Update(position)))
            }
            StepKind::LocationError(error) => {
                self.watched(Event::Location(LocationEvent::Error(error)))
            }
        };

        if let Some(event) = event {
            // The receiver lives as long as the runner
            let _ = self.sender.send((at, event));
            self.drain(pace);
        }
    }

    /// Fire countdown ticks due up to `until`, then move the clock there
    pub fn run_until(&mut self, until: Duration, pace: &mut impl FnMut(Duration)) {
        while let Some((due, handle)) = self.app.timer_mut().pop_due(until) {
            let _ = self.sender.send((due, Event::Tick(handle)));
            self.drain(pace);
        }
        self.app.timer_mut().advance_to(until);
        self.pace_to(until, pace);
    }

    /// Location samples only reach the monitor while a watch is active
    fn watched(&self, event: Event) -> Option<Event> {
        if self.app.location().is_watching() {
            Some(event)
        } else {
            trace!(?event, "no active watch, sample dropped");
            None
        }
    }

    fn drain(&mut self, pace: &mut impl FnMut(Duration)) {
        while let Ok((at, event)) = self.receiver.try_recv() {
            self.pace_to(at, pace);

            let before = (
                self.app.mode(),
                self.app.state().status.clone(),
                self.app.state().coords.clone(),
            );
            let error = self.app.dispatch(event).err().map(|e| e.to_string());
            let alerts = self.app.take_alerts();

            let state = self.app.state();
            let changed = before != (state.mode, state.status.clone(), state.coords.clone());
            if changed || !alerts.is_empty() || error.is_some() {
                self.record(describe(&event), alerts, error);
            }
        }
    }

    fn pace_to(&mut self, at: Duration, pace: &mut impl FnMut(Duration)) {
        if at > self.clock {
            pace(at - self.clock);
            self.clock = at;
        }
    }

    fn record(&mut self, event: String, alerts: Vec<Alert>, error: Option<String>) {
        let state = self.app.state();
        self.transcript.push(TranscriptEntry {
            at: self.clock.as_secs_f64(),
            event,
            state: state.mode,
            status: state.status.clone(),
            coords: state.coords.clone(),
            alerts,
            error,
        });
    }
}

/// Saturating: the end time adds the countdown to an already-checked step time
fn secs(seconds: f64) -> Duration {
    offset(seconds.max(0.0)).unwrap_or(Duration::MAX)
}

fn describe(event: &Event) -> String {
    match event {
        Event::Action(action) => format!("press \"{}\"", action.label()),
        Event::MapClicked(point) => format!("click ({:.6}, {:.6})", point.lat, point.lng),
        Event::Location(LocationEvent::Update(position)) => format!(
            "fix ({:.6}, {:.6}) ±{:.0} m",
            position.lat, position.lng, position.accuracy
        ),
        Event::Location(LocationEvent::Error(error)) => format!("location error: {}", error),
        Event::Tick(_) => "countdown tick".to_string(),
    }
}
