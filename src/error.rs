use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a location source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeofenceError {
    #[error("You need at least {required} points to create a boundary! (have {have})")]
    InsufficientVertices { required: usize, have: usize },

    #[error("Please create a boundary first!")]
    NoBoundary,

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Geolocation not supported")]
    UnsupportedEnvironment,

    #[error("Invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("\"{action}\" is not available while {state}")]
    NotAvailable {
        action: &'static str,
        state: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GeofenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_error_from_scenario_name() {
        let err: LocationError = serde_json::from_str("\"permission_denied\"").unwrap();
        assert_eq!(err, LocationError::PermissionDenied);
    }

    #[test]
    fn test_error_messages() {
        let err = GeofenceError::InsufficientVertices {
            required: 3,
            have: 2,
        };
        assert!(err.to_string().starts_with("You need at least 3 points"));

        let err: GeofenceError = LocationError::Timeout.into();
        assert_eq!(err.to_string(), "Location error: timed out");
    }
}
