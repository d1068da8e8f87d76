use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::domain::Position;
use crate::scenario::offset;

/// A recorded fix: seconds since the session started plus the position
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrackPoint {
    pub at: f64,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy: f64,
}

impl TrackPoint {
    pub fn position(&self) -> Result<Position> {
        Position::new(self.lat, self.lng, self.accuracy)
            .with_context(|| format!("Invalid track point at {}s", self.at))
    }
}

/// Parse a JSON array of track points
pub fn parse_track(json: &str) -> Result<Vec<TrackPoint>> {
    let points: Vec<TrackPoint> =
        serde_json::from_str(json).context("Failed to parse track JSON")?;

    for point in &points {
        offset(point.at).context("Track point has an invalid time")?;
        point.position()?;
    }

    Ok(points)
}

pub fn load_track(path: &Path) -> Result<Vec<TrackPoint>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read track file: {:?}", path))?;
    parse_track(&contents)
}
