use serde::{Deserialize, Serialize};

use super::Vertex;
use crate::error::{GeofenceError, Result};

/// A location fix reported by the location source
///
/// `accuracy` is the radius in meters and is only displayed, never used
/// for containment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64, accuracy: f64) -> Result<Self> {
        Vertex::new(lat, lng)?;
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(GeofenceError::InvalidCoordinate { lat, lng });
        }
        Ok(Self { lat, lng, accuracy })
    }

    /// Re-run range checks on a position built from deserialized data
    pub fn validated(self) -> Result<Self> {
        Self::new(self.lat, self.lng, self.accuracy)
    }

    pub fn point(&self) -> Vertex {
        Vertex::raw(self.lat, self.lng)
    }
}

/// Last computed containment result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Containment {
    /// No sample since monitoring started
    #[default]
    Unknown,
    Inside,
    Outside,
}

impl From<bool> for Containment {
    fn from(inside: bool) -> Self {
        if inside {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }
}
