use serde::{Deserialize, Serialize};

use crate::error::{GeofenceError, Result};
use crate::geometry;

/// A boundary corner as a (lat, lng) pair in WGS84
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub lat: f64,
    pub lng: f64,
}

impl Vertex {
    /// Create a vertex, rejecting non-finite or out-of-range coordinates
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite()
            || !lng.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(GeofenceError::InvalidCoordinate { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Unchecked constructor for planar test shapes and already-validated input
    pub const fn raw(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

/// A finalized, closed polygon. The edge from the last vertex back to the
/// first is implicit.
///
/// Immutable once built; a redraw or reset replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Boundary {
    vertices: Vec<Vertex>,
}

impl Boundary {
    /// Finalize a drawn vertex sequence
    ///
    /// # Arguments
    /// * `vertices` - Drawn vertices in click order
    /// * `min_vertices` - Minimum vertex count (never below 3)
    pub fn new(vertices: Vec<Vertex>, min_vertices: usize) -> Result<Self> {
        let required = min_vertices.max(3);
        if vertices.len() < required {
            return Err(GeofenceError::InsufficientVertices {
                required,
                have: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, point: Vertex) -> bool {
        geometry::is_inside(point, &self.vertices)
    }

    /// Meters from `point` to the closest boundary vertex
    pub fn distance_to(&self, point: Vertex) -> f64 {
        geometry::distance_to_nearest_edge(point, &self.vertices)
    }

    /// The boundary as a `geo` polygon (x = lng, y = lat)
    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        let exterior: geo::LineString<f64> = self
            .vertices
            .iter()
            .map(|v| geo::coord! { x: v.lng, y: v.lat })
            .collect();
        geo::Polygon::new(exterior, vec![])
    }
}
