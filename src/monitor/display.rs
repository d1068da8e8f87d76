//! Status and coordinate strings shown by the host

use crate::domain::{Containment, Position};
use crate::error::LocationError;

pub const WAITING_FOR_FIX: &str = "Waiting for GPS location...";
pub const IDLE: &str = "Click \"Start Drawing\" to create a boundary";
pub const BOUNDARY_CREATED: &str = "Boundary created! Ready to start monitoring.";
pub const MONITORING: &str = "🔴 Monitoring active - tracking your location...";
pub const WIPED: &str = "💀 Device wiped (simulated). Press Reset to start over.";

pub fn drawing(min_vertices: usize) -> String {
    format!(
        "Click on map to add boundary points (minimum {})",
        min_vertices
    )
}

pub fn points_added(count: usize) -> String {
    format!(
        "{} point{} added",
        count,
        if count > 1 { "s" } else { "" }
    )
}

pub fn coords(position: &Position) -> String {
    format!(
        "📍 Lat: {:.6}, Lng: {:.6} (±{:.0} m)",
        position.lat, position.lng, position.accuracy
    )
}

pub fn location_error(error: LocationError) -> String {
    format!("⚠️ Location error: {}", error)
}

/// Live status while monitoring
///
/// # Arguments
/// * `containment` - Result of the latest sample
/// * `distance_m` - Meters to the nearest boundary vertex
/// * `remaining_secs` - Countdown seconds when breached
pub fn monitoring(containment: Containment, distance_m: f64, remaining_secs: Option<u32>) -> String {
    let place = match containment {
        Containment::Inside => "🟢 Inside boundary",
        Containment::Outside => "🟠 Outside boundary",
        Containment::Unknown => MONITORING,
    };

    match remaining_secs {
        Some(secs) => format!(
            "{} - {:.0} m from nearest vertex - wipe in {}s",
            place, distance_m, secs
        ),
        None => format!("{} - {:.0} m from nearest vertex", place, distance_m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_added_plural() {
        assert_eq!(points_added(1), "1 point added");
        assert_eq!(points_added(4), "4 points added");
    }

    #[test]
    fn test_coords_format() {
        let position = Position::new(37.7749, -122.4194, 12.4).unwrap();
        assert_eq!(coords(&position), "📍 Lat: 37.774900, Lng: -122.419400 (±12 m)");
    }

    #[test]
    fn test_monitoring_status() {
        assert_eq!(
            monitoring(Containment::Inside, 42.3, None),
            "🟢 Inside boundary - 42 m from nearest vertex"
        );
        assert_eq!(
            monitoring(Containment::Outside, 7.0, Some(29)),
            "🟠 Outside boundary - 7 m from nearest vertex - wipe in 29s"
        );
    }
}
