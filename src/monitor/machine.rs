use tracing::{debug, info, trace, warn};

use super::countdown::{Countdown, CountdownTick, Timer, TimerHandle};
use super::{Alert, Controls, Event, MonitorSettings, MonitorState, UserAction, display};
use crate::domain::{Boundary, Containment, Position, Vertex};
use crate::error::{GeofenceError, LocationError, Result};
use crate::location::{LocationEvent, LocationSource, WatchHandle};
use crate::view::{MapView, OverlayKind};

/// Everything the monitor knows, owned in one place
#[derive(Debug)]
pub struct AppState {
    pub mode: MonitorState,
    /// Vertices clicked so far while drawing
    pub vertices: Vec<Vertex>,
    pub boundary: Option<Boundary>,
    pub was_inside: Containment,
    pub last_position: Option<Position>,
    pub status: String,
    pub coords: String,
    pub location_supported: bool,
    alerts: Vec<Alert>,
    countdown: Countdown,
    idle_watch: Option<WatchHandle>,
    monitor_watch: Option<WatchHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: MonitorState::Idle,
            vertices: Vec::new(),
            boundary: None,
            was_inside: Containment::Unknown,
            last_position: None,
            status: display::IDLE.to_string(),
            coords: display::WAITING_FOR_FIX.to_string(),
            location_supported: true,
            alerts: Vec::new(),
            countdown: Countdown::new(),
            idle_watch: None,
            monitor_watch: None,
        }
    }
}

impl AppState {
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }
}

/// The geofence state machine wired to its collaborators
///
/// # Type parameters
/// * `V` - Map the boundary and device marker are drawn on
/// * `L` - Device location capability
/// * `T` - Repeating timer driving the countdown
pub struct GeofenceApp<V, L, T> {
    settings: MonitorSettings,
    state: AppState,
    view: V,
    location: L,
    timer: T,
}

impl<V: MapView, L: LocationSource, T: Timer> GeofenceApp<V, L, T> {
    pub fn new(settings: MonitorSettings, view: V, location: L, timer: T) -> Self {
        Self {
            settings,
            state: AppState::default(),
            view,
            location,
            timer,
        }
    }

    /// Center the map and begin the always-on location watch
    ///
    /// A host without location support drops to draw-only mode.
    pub fn start(&mut self) {
        self.view.pan_to(self.settings.center, self.settings.zoom);
        match self.location.watch(self.settings.location.idle_options()) {
            Ok(handle) => self.state.idle_watch = Some(handle),
            Err(err) => self.surface(&err),
        }
    }

    /// Stop every watch and timer the monitor holds
    pub fn shutdown(&mut self) {
        self.state.countdown.cancel(&mut self.timer);
        for handle in [self.state.monitor_watch.take(), self.state.idle_watch.take()]
            .into_iter()
            .flatten()
        {
            self.location.stop_watching(handle);
        }
    }

    /// Process one event to completion
    ///
    /// Errors are already reflected in the status text and alerts when
    /// returned; the state is always consistent.
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        let result = match event {
            Event::Action(action) => self.on_action(action),
            Event::MapClicked(point) => self.on_map_click(point),
            Event::Location(LocationEvent::Update(position)) => self.on_position(position),
            Event::Location(LocationEvent::Error(error)) => self.on_location_error(error),
            Event::Tick(handle) => {
                self.on_tick(handle);
                Ok(())
            }
        };

        if let Err(ref err) = result {
            self.surface(err);
        }
        result
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn mode(&self) -> MonitorState {
        self.state.mode
    }

    pub fn controls(&self) -> Controls {
        Controls::for_state(self.state.mode, self.state.location_supported)
    }

    /// Drain alerts raised since the last call
    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.state.alerts)
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    fn transition(&mut self, next: MonitorState) {
        if self.state.mode != next {
            debug!(from = %self.state.mode, to = %next, "state transition");
        }
        self.state.mode = next;
    }

    fn surface(&mut self, err: &GeofenceError) {
        warn!(error = %err, state = %self.state.mode, "geofence error");
        match err {
            GeofenceError::Location(error) => {
                self.state.coords = display::location_error(*error);
            }
            GeofenceError::UnsupportedEnvironment => {
                self.state.location_supported = false;
                self.state.coords = err.to_string();
                self.state.alerts.push(Alert::Warning(err.to_string()));
            }
            _ => {
                self.state.status = err.to_string();
                self.state.alerts.push(Alert::Warning(err.to_string()));
            }
        }
    }

    fn on_action(&mut self, action: UserAction) -> Result<()> {
        if !self.controls().allows(action) {
            return Err(self.rejection(action));
        }

        match action {
            UserAction::StartDrawing => {
                self.start_drawing();
                Ok(())
            }
            UserAction::FinishDrawing => self.finish_drawing(),
            UserAction::StartMonitoring => self.start_monitoring(),
            UserAction::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    fn rejection(&self, action: UserAction) -> GeofenceError {
        match action {
            UserAction::StartMonitoring if self.state.boundary.is_none() => {
                GeofenceError::NoBoundary
            }
            UserAction::StartMonitoring
                if self.state.mode == MonitorState::Ready && !self.state.location_supported =>
            {
                GeofenceError::UnsupportedEnvironment
            }
            _ => GeofenceError::NotAvailable {
                action: action.label(),
                state: self.state.mode.label(),
            },
        }
    }

    fn start_drawing(&mut self) {
        self.state.vertices.clear();
        self.state.boundary = None;
        self.view.remove_overlays(&OverlayKind::BOUNDARY);
        self.state.status = display::drawing(self.settings.min_vertices);
        self.transition(MonitorState::Drawing);
    }

    fn on_map_click(&mut self, point: Vertex) -> Result<()> {
        if self.state.mode != MonitorState::Drawing {
            trace!(lat = point.lat, lng = point.lng, "click ignored outside drawing");
            return Ok(());
        }

        let point = Vertex::new(point.lat, point.lng)?;
        let color = &self.settings.palette.drawing;
        self.state.vertices.push(point);
        self.view.render_vertex_marker(point, color);

        let count = self.state.vertices.len();
        if count > 1 {
            self.view
                .render_polyline(&self.state.vertices[count - 2..], color);
        }
        self.state.status = display::points_added(count);
        Ok(())
    }

    fn finish_drawing(&mut self) -> Result<()> {
        let boundary = Boundary::new(self.state.vertices.clone(), self.settings.min_vertices)?;

        self.state.vertices.clear();
        self.view.remove_overlays(&OverlayKind::DRAFT);
        self.view
            .render_polygon(boundary.vertices(), &self.settings.palette.boundary());
        info!(vertices = boundary.len(), "boundary finalized");

        self.state.boundary = Some(boundary);
        self.state.status = display::BOUNDARY_CREATED.to_string();
        self.transition(MonitorState::Ready);
        Ok(())
    }

    fn start_monitoring(&mut self) -> Result<()> {
        let Some(boundary) = self.state.boundary.as_ref() else {
            return Err(GeofenceError::NoBoundary);
        };

        let baseline = self.state.last_position.map(|p| {
            let point = p.point();
            (Containment::from(boundary.contains(point)), boundary.distance_to(point))
        });

        let handle = self
            .location
            .watch(self.settings.location.monitor_options())?;
        self.state.monitor_watch = Some(handle);

        self.view.set_polygon_style(&self.settings.palette.armed());
        self.state.status = match baseline {
            Some((containment, distance)) => display::monitoring(containment, distance, None),
            None => display::MONITORING.to_string(),
        };
        self.state.was_inside = baseline.map_or(Containment::Unknown, |(c, _)| c);
        info!(baseline = ?self.state.was_inside, "monitoring started");
        self.transition(MonitorState::Monitoring);
        Ok(())
    }

    fn on_position(&mut self, position: Position) -> Result<()> {
        let position = position.validated()?;
        let first_fix = self.state.last_position.is_none();

        self.state.last_position = Some(position);
        self.state.coords = display::coords(&position);
        self.view.render_position(&position);
        if first_fix {
            self.view.pan_to(position.point(), self.settings.follow_zoom);
        }

        if !self.state.mode.is_monitoring() {
            return Ok(());
        }
        let Some(boundary) = self.state.boundary.as_ref() else {
            return Ok(());
        };

        let point = position.point();
        let inside = Containment::from(boundary.contains(point));
        let distance = boundary.distance_to(point);

        match (self.state.was_inside, inside) {
            (Containment::Unknown, _) => debug!(?inside, "baseline sample"),
            (Containment::Inside, Containment::Outside) => self.breach(),
            (Containment::Outside, Containment::Inside) => self.recover(),
            _ => {}
        }
        self.state.was_inside = inside;

        if let Some(remaining) = self.monitoring_countdown() {
            self.state.status = display::monitoring(inside, distance, remaining);
        }
        Ok(())
    }

    /// `Some(None)` while monitoring, `Some(Some(secs))` while breached
    fn monitoring_countdown(&self) -> Option<Option<u32>> {
        match self.state.mode {
            MonitorState::Monitoring => Some(None),
            MonitorState::Breached { remaining_secs } => Some(Some(remaining_secs)),
            _ => None,
        }
    }

    fn on_location_error(&mut self, error: LocationError) -> Result<()> {
        Err(GeofenceError::Location(error))
    }

    fn breach(&mut self) {
        info!("boundary breached");
        self.view.set_polygon_style(&self.settings.palette.breach());
        self.state.alerts.push(Alert::Breach);

        let secs = self.settings.countdown_secs;
        if secs == 0 {
            self.wipe();
            return;
        }
        self.state.countdown.start(&mut self.timer, secs);
        self.transition(MonitorState::Breached {
            remaining_secs: secs,
        });
    }

    /// Every Outside→Inside crossing alerts, whether or not a countdown
    /// was running (an Outside baseline has none to cancel)
    fn recover(&mut self) {
        let wipe_cancelled = self.state.countdown.cancel(&mut self.timer);
        self.view.set_polygon_style(&self.settings.palette.safe());
        info!(wipe_cancelled, "re-entered boundary");
        self.state.alerts.push(Alert::ReEntered { wipe_cancelled });
        self.transition(MonitorState::Monitoring);
    }

    fn on_tick(&mut self, handle: TimerHandle) {
        match self.state.countdown.tick(&mut self.timer, handle) {
            CountdownTick::Stale => {}
            CountdownTick::Remaining(secs) => {
                trace!(remaining = secs, "countdown tick");
                self.transition(MonitorState::Breached {
                    remaining_secs: secs,
                });
                let distance = match (&self.state.boundary, &self.state.last_position) {
                    (Some(boundary), Some(position)) => boundary.distance_to(position.point()),
                    _ => 0.0,
                };
                self.state.status =
                    display::monitoring(Containment::Outside, distance, Some(secs));
            }
            CountdownTick::Expired => self.wipe(),
        }
    }

    fn wipe(&mut self) {
        warn!("countdown expired, wiping device (simulated)");
        self.state.countdown.cancel(&mut self.timer);
        if let Some(handle) = self.state.monitor_watch.take() {
            self.location.stop_watching(handle);
        }
        self.view.set_polygon_style(&self.settings.palette.wiped());
        self.state.alerts.push(Alert::Wiped);
        self.state.status = display::WIPED.to_string();
        self.transition(MonitorState::Wiped);
    }

    fn reset(&mut self) {
        self.state.countdown.cancel(&mut self.timer);
        if let Some(handle) = self.state.monitor_watch.take() {
            self.location.stop_watching(handle);
        }

        self.state.vertices.clear();
        self.state.boundary = None;
        self.state.was_inside = Containment::Unknown;
        self.view.remove_all_overlays();
        self.state.status = display::IDLE.to_string();
        self.transition(MonitorState::Idle);
    }
}
