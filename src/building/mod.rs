//! Town structure: patches, walls, routing and polygon subdivision

pub mod cutter;
mod curtain_wall;
mod patch;
mod topology;

pub use curtain_wall::CurtainWall;
pub use cutter::Ring;
pub use patch::Patch;
pub use topology::Topology;

pub(crate) use patch::{is_enclosed, neighbour, patches_by_vertex};

/// Width of streets leading from the gates
pub const MAIN_STREET: f64 = 2.0;
/// Width of streets between city wards
pub const REGULAR_STREET: f64 = 1.0;
/// Width of alleys between buildings
pub const ALLEY: f64 = 0.6;

#[cfg(test)]
pub(crate) use patch::tests::grid_patches;
