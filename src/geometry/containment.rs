use crate::domain::Vertex;

/// Ray-casting point-in-polygon test
///
/// Longitude is the sweep axis: an edge counts as a crossing when it
/// straddles the point's longitude and the edge's latitude at that longitude
/// lies strictly beyond the point's latitude. The vertex list is cyclic.
///
/// The straddle test is half-open, so points exactly on the boundary are
/// resolved one-sidedly. For the square (0,0),(0,10),(10,10),(10,0):
/// - (0, 5) and (5, 0) are inside
/// - (10, 5) and (5, 10) are outside
///
/// Self-intersecting boundaries follow the even-odd rule. Fewer than three
/// vertices never contain anything.
pub fn is_inside(point: Vertex, boundary: &[Vertex]) -> bool {
    let n = boundary.len();
    if n < 3 {
        return false;
    }

    let (x, y) = (point.lat, point.lng);
    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (boundary[i].lat, boundary[i].lng);
        let (xj, yj) = (boundary[j].lat, boundary[j].lng);

        // (yi > y) != (yj > y) guarantees yj != yi
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Centroid, Contains};

    fn square() -> Vec<Vertex> {
        vec![
            Vertex::raw(0.0, 0.0),
            Vertex::raw(0.0, 10.0),
            Vertex::raw(10.0, 10.0),
            Vertex::raw(10.0, 0.0),
        ]
    }

    fn regular_polygon(sides: usize, center: (f64, f64), radius: f64) -> Vec<Vertex> {
        (0..sides)
            .map(|k| {
                let angle = std::f64::consts::TAU * k as f64 / sides as f64;
                Vertex::raw(center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
            })
            .collect()
    }

    #[test]
    fn test_square_inside_and_outside() {
        assert!(is_inside(Vertex::raw(5.0, 5.0), &square()));
        assert!(!is_inside(Vertex::raw(15.0, 15.0), &square()));
        assert!(!is_inside(Vertex::raw(-1.0, 5.0), &square()));
    }

    #[test]
    fn test_square_edges_are_half_open() {
        assert!(is_inside(Vertex::raw(0.0, 5.0), &square()));
        assert!(is_inside(Vertex::raw(5.0, 0.0), &square()));
        assert!(!is_inside(Vertex::raw(10.0, 5.0), &square()));
        assert!(!is_inside(Vertex::raw(5.0, 10.0), &square()));
    }

    #[test]
    fn test_winding_order_does_not_matter() {
        let mut reversed = square();
        reversed.reverse();
        assert!(is_inside(Vertex::raw(5.0, 5.0), &reversed));
        assert!(!is_inside(Vertex::raw(15.0, 5.0), &reversed));
    }

    #[test]
    fn test_regular_polygon_centroid_inside() {
        for sides in 3..12 {
            let vertices = regular_polygon(sides, (37.77, -122.42), 0.01);
            let polygon = crate::domain::Boundary::new(vertices.clone(), 3)
                .unwrap()
                .to_polygon();
            let centroid = polygon.centroid().unwrap();

            assert!(
                is_inside(Vertex::raw(centroid.y(), centroid.x()), &vertices),
                "centroid outside {}-gon",
                sides
            );
            assert!(!is_inside(Vertex::raw(37.77 + 1.0, -122.42 + 1.0), &vertices));
        }
    }

    #[test]
    fn test_concave_polygon_agrees_with_geo() {
        // U shape opening north
        let vertices = vec![
            Vertex::raw(0.0, 0.0),
            Vertex::raw(10.0, 0.0),
            Vertex::raw(10.0, 3.0),
            Vertex::raw(3.0, 3.0),
            Vertex::raw(3.0, 7.0),
            Vertex::raw(10.0, 7.0),
            Vertex::raw(10.0, 10.0),
            Vertex::raw(0.0, 10.0),
        ];
        let polygon = crate::domain::Boundary::new(vertices.clone(), 3)
            .unwrap()
            .to_polygon();

        let samples = [(1.5, 5.0), (6.0, 5.0), (6.0, 1.5), (6.0, 8.5), (12.0, 5.0)];
        for (lat, lng) in samples {
            let expected = polygon.contains(&geo::Point::new(lng, lat));
            assert_eq!(
                is_inside(Vertex::raw(lat, lng), &vertices),
                expected,
                "({}, {})",
                lat,
                lng
            );
        }
    }

    #[test]
    fn test_degenerate_boundaries() {
        assert!(!is_inside(Vertex::raw(0.0, 0.0), &[]));
        let line = [Vertex::raw(0.0, 0.0), Vertex::raw(10.0, 10.0)];
        assert!(!is_inside(Vertex::raw(5.0, 5.0), &line));
    }
}
