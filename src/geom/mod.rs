//! Planar geometry: shared points, polygons and line helpers

mod point;
mod polygon;
pub mod utils;

pub use point::{PointArena, PointId};
pub use polygon::Polygon;
