//! Map rendering seam
//!
//! The monitor drives a map through [`MapView`] and never inspects what it
//! has drawn. Every overlay is tagged with an [`OverlayKind`] when created so
//! it can be removed selectively.

pub mod recording;

use serde::{Deserialize, Serialize};

use crate::domain::{Position, Vertex};

pub use recording::{Overlay, RecordingView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Temporary marker for a vertex clicked while drawing
    VertexMarker,
    /// Temporary line joining consecutive drawn vertices
    Polyline,
    /// The finalized boundary
    Polygon,
    /// The device marker
    Position,
}

impl OverlayKind {
    /// Overlays that exist only while a boundary is being drawn
    pub const DRAFT: [OverlayKind; 2] = [OverlayKind::VertexMarker, OverlayKind::Polyline];
    /// Everything that makes up a boundary, drafted or finalized
    pub const BOUNDARY: [OverlayKind; 3] = [
        OverlayKind::VertexMarker,
        OverlayKind::Polyline,
        OverlayKind::Polygon,
    ];
}

/// Stroke and fill for the boundary polygon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f32,
    pub weight: u8,
}

impl PolygonStyle {
    pub fn solid(color: &str) -> Self {
        Self {
            color: color.to_string(),
            fill_color: color.to_string(),
            fill_opacity: 0.2,
            weight: 2,
        }
    }
}

fn default_drawing() -> String {
    "#667eea".to_string()
}
fn default_boundary() -> String {
    "#4caf50".to_string()
}
fn default_armed() -> String {
    "#f44336".to_string()
}
fn default_breach() -> String {
    "#ff9800".to_string()
}
fn default_safe() -> String {
    "#4caf50".to_string()
}
fn default_wiped() -> String {
    "#212121".to_string()
}

/// Colors for each boundary phase
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Palette {
    #[serde(default = "default_drawing")]
    pub drawing: String,
    #[serde(default = "default_boundary")]
    pub boundary: String,
    #[serde(default = "default_armed")]
    pub armed: String,
    #[serde(default = "default_breach")]
    pub breach: String,
    #[serde(default = "default_safe")]
    pub safe: String,
    #[serde(default = "default_wiped")]
    pub wiped: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            drawing: default_drawing(),
            boundary: default_boundary(),
            armed: default_armed(),
            breach: default_breach(),
            safe: default_safe(),
            wiped: default_wiped(),
        }
    }
}

impl Palette {
    pub fn boundary(&self) -> PolygonStyle {
        PolygonStyle::solid(&self.boundary)
    }

    pub fn armed(&self) -> PolygonStyle {
        PolygonStyle::solid(&self.armed)
    }

    pub fn breach(&self) -> PolygonStyle {
        PolygonStyle::solid(&self.breach)
    }

    pub fn safe(&self) -> PolygonStyle {
        PolygonStyle::solid(&self.safe)
    }

    pub fn wiped(&self) -> PolygonStyle {
        PolygonStyle {
            fill_opacity: 0.5,
            ..PolygonStyle::solid(&self.wiped)
        }
    }
}

/// Rendering capability the monitor needs from a map widget
pub trait MapView {
    fn render_vertex_marker(&mut self, point: Vertex, color: &str);
    fn render_polyline(&mut self, points: &[Vertex], color: &str);
    fn render_polygon(&mut self, points: &[Vertex], style: &PolygonStyle);
    /// Restyle the current boundary polygon, if one is drawn
    fn set_polygon_style(&mut self, style: &PolygonStyle);
    /// Move (or create) the device marker
    fn render_position(&mut self, position: &Position);
    fn remove_overlays(&mut self, kinds: &[OverlayKind]);
    fn remove_all_overlays(&mut self);
    fn pan_to(&mut self, point: Vertex, zoom: u8);
}
