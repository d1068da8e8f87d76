//! Scripted sessions: user actions and location samples on a timeline
//!
//! ```toml
//! run_until = 60.0
//!
//! [[step]]
//! at = 0.0
//! action = "start_drawing"
//!
//! [[step]]
//! at = 1.0
//! click = [37.770, -122.420]
//!
//! [[step]]
//! at = 12.0
//! position = { lat = 37.775, lng = -122.415, accuracy = 6.0 }
//!
//! [[step]]
//! at = 14.0
//! location_error = "timeout"
//! ```

pub mod runner;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::domain::Position;
use crate::error::LocationError;
use crate::location::TrackPoint;
use crate::monitor::UserAction;

pub use runner::{Runner, TranscriptEntry};

/// Convert a timeline offset in seconds, rejecting values a `Duration`
/// cannot hold
pub fn offset(seconds: f64) -> Result<Duration> {
    if seconds < 0.0 {
        bail!("time must not be negative: {}", seconds);
    }
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("time out of range: {}", seconds))
}

fn default_geolocation() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// `false` simulates a host with no location capability
    #[serde(default = "default_geolocation")]
    pub geolocation: bool,
    /// Seconds to keep the clock running after the last step
    #[serde(default)]
    pub run_until: Option<f64>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "StepTable")]
pub struct Step {
    /// Seconds since the session started
    pub at: f64,
    pub kind: StepKind,
}

#[derive(Debug, Clone)]
pub enum StepKind {
    Action(UserAction),
    /// [lat, lng] clicked on the map
    Click([f64; 2]),
    Position(Position),
    LocationError(LocationError),
}

/// A `[[step]]` table as written, before checking it names one occurrence
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StepTable {
    at: f64,
    action: Option<UserAction>,
    click: Option<[f64; 2]>,
    position: Option<Position>,
    location_error: Option<LocationError>,
}

impl TryFrom<StepTable> for Step {
    type Error = String;

    fn try_from(table: StepTable) -> std::result::Result<Self, Self::Error> {
        let kinds: Vec<StepKind> = [
            table.action.map(StepKind::Action),
            table.click.map(StepKind::Click),
            table.position.map(StepKind::Position),
            table.location_error.map(StepKind::LocationError),
        ]
        .into_iter()
        .flatten()
        .collect();

        match kinds.as_slice() {
            [kind] => Ok(Step {
                at: table.at,
                kind: kind.clone(),
            }),
            _ => Err(format!(
                "step at {}s needs exactly one of action, click, position, location_error (found {})",
                table.at,
                kinds.len()
            )),
        }
    }
}

impl Scenario {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut scenario: Scenario =
            toml::from_str(contents).context("Failed to parse scenario file")?;
        scenario.validate()?;
        scenario.sort();
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {:?}", path))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid scenario: {:?}", path))
    }

    /// Add recorded positions to the timeline
    pub fn merge_track(&mut self, track: &[TrackPoint]) -> Result<()> {
        for point in track {
            offset(point.at).context("Invalid track point")?;
            self.steps.push(Step {
                at: point.at,
                kind: StepKind::Position(point.position()?),
            });
        }
        self.sort();
        Ok(())
    }

    /// When the clock stops: `run_until`, or long enough after the last step
    /// for a countdown started there to finish
    pub fn end_time(&self, countdown_secs: u32) -> f64 {
        let last = self.steps.last().map_or(0.0, |s| s.at);
        self.run_until
            .unwrap_or(last + countdown_secs as f64 + 1.0)
            .max(last)
    }

    fn validate(&self) -> Result<()> {
        if let Some(until) = self.run_until {
            offset(until).context("Invalid run_until")?;
        }

        for (i, step) in self.steps.iter().enumerate() {
            offset(step.at).with_context(|| format!("Step {} has an invalid time", i + 1))?;
            if let StepKind::Position(position) = &step.kind {
                position
                    .validated()
                    .with_context(|| format!("Step {} has an invalid position", i + 1))?;
            }
        }
        Ok(())
    }

    /// Stable, so steps sharing a time keep file order
    fn sort(&mut self) {
        self.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        run_until = 45.0

        [[step]]
        at = 0.0
        action = "start_drawing"

        [[step]]
        at = 2.0
        position = { lat = 37.775, lng = -122.415, accuracy = 6.0 }

        [[step]]
        at = 1.0
        click = [37.770, -122.420]

        [[step]]
        at = 3.0
        location_error = "permission_denied"
    "#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_toml(SCENARIO).unwrap();

        assert!(scenario.geolocation);
        assert_eq!(scenario.steps.len(), 4);
        assert!(matches!(
            scenario.steps[0].kind,
            StepKind::Action(UserAction::StartDrawing)
        ));
        // Sorted by time
        assert!(matches!(scenario.steps[1].kind, StepKind::Click([lat, _]) if lat == 37.770));
        assert!(matches!(scenario.steps[2].kind, StepKind::Position(p) if p.accuracy == 6.0));
        assert!(matches!(
            scenario.steps[3].kind,
            StepKind::LocationError(LocationError::PermissionDenied)
        ));
        assert_eq!(scenario.end_time(30), 45.0);
    }

    #[test]
    fn test_rejects_invalid_steps() {
        let negative = "[[step]]\nat = -1.0\naction = \"reset\"";
        assert!(Scenario::from_toml(negative).is_err());

        let bad_position = "[[step]]\nat = 1.0\nposition = { lat = 95.0, lng = 0.0 }";
        assert!(Scenario::from_toml(bad_position).is_err());

        let unknown_action = "[[step]]\nat = 1.0\naction = \"teleport\"";
        assert!(Scenario::from_toml(unknown_action).is_err());
    }

    #[test]
    fn test_step_needs_exactly_one_kind() {
        let two_kinds = "[[step]]\nat = 1.0\naction = \"reset\"\nclick = [1.0, 2.0]";
        let err = Scenario::from_toml(two_kinds).unwrap_err();
        assert!(format!("{:#}", err).contains("found 2"));

        let no_kind = "[[step]]\nat = 1.0";
        assert!(Scenario::from_toml(no_kind).is_err());

        let misspelled = "[[step]]\nat = 1.0\nclik = [1.0, 2.0]";
        assert!(Scenario::from_toml(misspelled).is_err());
    }

    #[test]
    fn test_rejects_times_beyond_duration_range() {
        let huge_step = "[[step]]\nat = 1e20\naction = \"reset\"";
        assert!(Scenario::from_toml(huge_step).is_err());

        let huge_until = "run_until = 1e20";
        assert!(Scenario::from_toml(huge_until).is_err());

        let mut scenario = Scenario::from_toml(SCENARIO).unwrap();
        let far = [TrackPoint {
            at: 1e20,
            lat: 37.776,
            lng: -122.416,
            accuracy: 4.0,
        }];
        assert!(scenario.merge_track(&far).is_err());
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(1.5).unwrap(), Duration::from_millis(1500));
        assert!(offset(-0.5).is_err());
        assert!(offset(f64::NAN).is_err());
        assert!(offset(f64::INFINITY).is_err());
        assert!(offset(1e20).is_err());
    }

    #[test]
    fn test_merge_track() {
        let mut scenario = Scenario::from_toml(SCENARIO).unwrap();
        let track = [TrackPoint {
            at: 1.5,
            lat: 37.776,
            lng: -122.416,
            accuracy: 4.0,
        }];
        scenario.merge_track(&track).unwrap();

        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(scenario.steps[2].at, 1.5);
    }

    #[test]
    fn test_end_time_defaults_past_countdown() {
        let scenario = Scenario::from_toml("[[step]]\nat = 10.0\naction = \"reset\"").unwrap();
        assert_eq!(scenario.end_time(30), 41.0);
        assert_eq!(Scenario::from_toml("").unwrap().end_time(0), 1.0);
    }

    #[test]
    fn test_load_scenario_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.toml");
        std::fs::write(&path, "geolocation = false\n").unwrap();

        let scenario = Scenario::load(&path).unwrap();
        assert!(!scenario.geolocation);
        assert!(scenario.steps.is_empty());
    }
}
