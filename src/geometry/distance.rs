use geo::{Distance, Haversine};

use crate::domain::Vertex;

/// Great-circle distance in meters between two vertices
pub fn haversine_distance(a: Vertex, b: Vertex) -> f64 {
    Haversine::distance(a.to_point(), b.to_point())
}

/// Distance in meters from `point` to the nearest boundary vertex
///
/// This measures to vertices, not to edge segments, so a point close to the
/// middle of a long edge reports the distance to that edge's nearer end.
/// Returns 0.0 for boundaries with fewer than three vertices.
pub fn distance_to_nearest_edge(point: Vertex, boundary: &[Vertex]) -> f64 {
    if boundary.len() < 3 {
        return 0.0;
    }

    boundary
        .iter()
        .map(|&v| haversine_distance(point, v))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_one_degree_latitude() {
        // 1 degree latitude ≈ 111.2 km on the mean-radius sphere
        let d = haversine_distance(Vertex::raw(0.0, 0.0), Vertex::raw(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn test_nearest_vertex_is_used() {
        let boundary = [
            Vertex::raw(0.0, 0.0),
            Vertex::raw(0.0, 0.01),
            Vertex::raw(0.01, 0.01),
            Vertex::raw(0.01, 0.0),
        ];
        let point = Vertex::raw(0.0, 0.0009);
        let d = distance_to_nearest_edge(point, &boundary);
        let expected = haversine_distance(point, boundary[0]);
        assert!((d - expected).abs() < 1e-9);
        assert!(d > 90.0 && d < 110.0);
    }

    #[test]
    fn test_edge_midpoint_reports_vertex_distance() {
        let boundary = [
            Vertex::raw(0.0, 0.0),
            Vertex::raw(0.0, 0.02),
            Vertex::raw(0.02, 0.02),
            Vertex::raw(0.02, 0.0),
        ];
        // On the southern edge, halfway along
        let d = distance_to_nearest_edge(Vertex::raw(0.0, 0.01), &boundary);
        assert!(d > 1000.0);
    }

    #[test]
    fn test_too_few_vertices_is_zero() {
        let boundary = [Vertex::raw(0.0, 0.0), Vertex::raw(1.0, 1.0)];
        assert_eq!(distance_to_nearest_edge(Vertex::raw(5.0, 5.0), &boundary), 0.0);
    }
}
