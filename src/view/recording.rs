use serde::Serialize;

use super::{MapView, OverlayKind, PolygonStyle};
use crate::domain::{Position, Vertex};

/// An overlay currently on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    VertexMarker { point: Vertex, color: String },
    Polyline { points: Vec<Vertex>, color: String },
    Polygon { points: Vec<Vertex>, style: PolygonStyle },
    Position { position: Position },
}

impl Overlay {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Overlay::VertexMarker { .. } => OverlayKind::VertexMarker,
            Overlay::Polyline { .. } => OverlayKind::Polyline,
            Overlay::Polygon { .. } => OverlayKind::Polygon,
            Overlay::Position { .. } => OverlayKind::Position,
        }
    }
}

/// In-memory map that keeps its overlays in creation order
#[derive(Debug, Default)]
pub struct RecordingView {
    overlays: Vec<Overlay>,
    view: Option<(Vertex, u8)>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn count(&self, kind: OverlayKind) -> usize {
        self.overlays.iter().filter(|o| o.kind() == kind).count()
    }

    pub fn polygon_style(&self) -> Option<&PolygonStyle> {
        self.overlays.iter().find_map(|o| match o {
            Overlay::Polygon { style, .. } => Some(style),
            _ => None,
        })
    }

    /// Current center and zoom
    pub fn view(&self) -> Option<(Vertex, u8)> {
        self.view
    }
}

impl MapView for RecordingView {
    fn render_vertex_marker(&mut self, point: Vertex, color: &str) {
        self.overlays.push(Overlay::VertexMarker {
            point,
            color: color.to_string(),
        });
    }

    fn render_polyline(&mut self, points: &[Vertex], color: &str) {
        self.overlays.push(Overlay::Polyline {
            points: points.to_vec(),
            color: color.to_string(),
        });
    }

    fn render_polygon(&mut self, points: &[Vertex], style: &PolygonStyle) {
        self.overlays.push(Overlay::Polygon {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn set_polygon_style(&mut self, new_style: &PolygonStyle) {
        for overlay in &mut self.overlays {
            if let Overlay::Polygon { style, .. } = overlay {
                *style = new_style.clone();
            }
        }
    }

    fn render_position(&mut self, position: &Position) {
        for overlay in &mut self.overlays {
            if let Overlay::Position { position: current } = overlay {
                *current = *position;
                return;
            }
        }
        self.overlays.push(Overlay::Position {
            position: *position,
        });
    }

    fn remove_overlays(&mut self, kinds: &[OverlayKind]) {
        self.overlays.retain(|o| !kinds.contains(&o.kind()));
    }

    fn remove_all_overlays(&mut self) {
        self.overlays.clear();
    }

    fn pan_to(&mut self, point: Vertex, zoom: u8) {
        self.view = Some((point, zoom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selective_removal() {
        let mut view = RecordingView::new();
        view.render_vertex_marker(Vertex::raw(0.0, 0.0), "#667eea");
        view.render_vertex_marker(Vertex::raw(0.0, 1.0), "#667eea");
        view.render_polyline(&[Vertex::raw(0.0, 0.0), Vertex::raw(0.0, 1.0)], "#667eea");
        view.render_position(&Position::new(0.5, 0.5, 3.0).unwrap());

        view.remove_overlays(&OverlayKind::DRAFT);

        assert_eq!(view.overlays().len(), 1);
        assert_eq!(view.count(OverlayKind::Position), 1);
    }

    #[test]
    fn test_position_marker_moves_instead_of_duplicating() {
        let mut view = RecordingView::new();
        view.render_position(&Position::new(1.0, 1.0, 3.0).unwrap());
        view.render_position(&Position::new(2.0, 2.0, 3.0).unwrap());

        assert_eq!(view.count(OverlayKind::Position), 1);
        assert!(matches!(
            view.overlays()[0],
            Overlay::Position { position } if position.lat == 2.0
        ));
    }

    #[test]
    fn test_set_polygon_style() {
        let mut view = RecordingView::new();
        let points = [
            Vertex::raw(0.0, 0.0),
            Vertex::raw(0.0, 1.0),
            Vertex::raw(1.0, 1.0),
        ];
        view.render_polygon(&points, &PolygonStyle::solid("#4caf50"));
        view.set_polygon_style(&PolygonStyle::solid("#f44336"));

        assert_eq!(view.polygon_style().unwrap().color, "#f44336");
    }
}
