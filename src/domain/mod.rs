pub mod boundary;
pub mod position;

pub use boundary::{Boundary, Vertex};
pub use position::{Containment, Position};
