//! geofence - Draw a polygonal boundary and alert when a device leaves it

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod location;
pub mod monitor;
pub mod scenario;
pub mod view;
