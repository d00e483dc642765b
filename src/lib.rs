//! Procedural medieval town generation from Voronoi patches
//!
//! A standalone library that lays out a town map from a seed: irregular
//! patches, an optional curtain wall with gates and towers, an optional walled
//! citadel, streets and roads routed between the gates, and building
//! footprints for every ward. Rendering is left to the caller.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rust_voronoi_town::*;
//!
//! // Configure a walled town
//! let config = TownConfigBuilder::new()
//!     .seed(42)
//!     .size(TownSize::SmallCity)
//!     .walls(true)
//!     .build().unwrap();
//!
//! let town = Town::generate(config).unwrap();
//!
//! // Walk the result
//! for wall in town.walls() {
//!     println!("wall with {} gates and {} towers", wall.gates.len(), wall.towers.len());
//! }
//! for street in town.streets() {
//!     let line: Vec<DVec2> = town.polyline(street);
//!     println!("street of {} points", line.len());
//! }
//! println!("{} markets", town.ward_count(WardKind::Market));
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): KD-tree lookup of the routing vertex nearest to a position
//! - `serde`: Serialization support for configuration and ward kinds

// Modules
pub mod error;
pub mod config;
pub mod random;
pub mod geom;
pub mod generation;
pub mod graph;
pub mod building;
pub mod wards;
pub mod town;
mod util;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{TownError, Result};
pub use config::{TownConfig, TownConfigBuilder, TownSize};
pub use random::{RandomSource, SeededRandom};
pub use geom::{PointArena, PointId, Polygon};
pub use generation::{LloydOptions, Voronoi};
pub use graph::{Graph, NodeId};
pub use building::{CurtainWall, Patch, Topology};
pub use wards::{Ward, WardKind};
pub use town::Town;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
