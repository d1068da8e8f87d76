pub mod containment;
pub mod distance;

pub use containment::is_inside;
pub use distance::{distance_to_nearest_edge, haversine_distance};
