//! Plane partitioning into patch outlines
//!
//! Seeds are scattered on a spiral, triangulated, relaxed around the centre,
//! and the Voronoi cells clear of the bootstrap frame become patch shapes.

mod lloyd;
mod points;
mod voronoi;

pub use lloyd::{relax_central, LloydOptions};
pub use points::spiral_points;
pub use voronoi::{Region, Triangle, Voronoi};

use crate::error::Result;
use crate::geom::{PointArena, Polygon};
use crate::random::RandomSource;

/// Seeds scattered per requested patch
pub const SEEDS_PER_PATCH: usize = 8;

/// Generate patch outlines for a town of `patch_count` inner patches
///
/// Returns the point storage together with the cells ordered by the distance
/// of their seed from the origin, so the first outline is the most central.
pub fn partition_plane<R: RandomSource>(
    patch_count: usize,
    rng: &mut R,
) -> Result<(PointArena, Vec<Polygon>)> {
    // Step 1: Scatter seeds on the spiral
    let seeds = spiral_points(patch_count * SEEDS_PER_PATCH, rng);

    // Step 2: Triangulate and relax the central cells
    let voronoi = Voronoi::build(&seeds)?;
    let mut voronoi = relax_central(voronoi, patch_count, LloydOptions::default())?;

    // Step 3: Keep real cells, most central first
    let mut regions = voronoi.partitioning();
    let arena = voronoi.into_arena();
    regions.sort_by(|a, b| arena[a.seed].length().total_cmp(&arena[b.seed].length()));

    let outlines = regions.iter().map(|r| r.polygon()).collect();
    Ok((arena, outlines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    #[test]
    fn test_partition_plane() {
        let mut rng = SeededRandom::new(42);
        let (arena, outlines) = partition_plane(15, &mut rng).unwrap();
        assert!(outlines.len() > 15);

        for poly in &outlines {
            assert!(poly.len() >= 3);
            assert!(poly.area(&arena) > 0.0);
        }
        let inner = outlines[0].center(&arena).length();
        let outer = outlines[outlines.len() - 1].center(&arena).length();
        assert!(inner < outer);
    }

    #[test]
    fn test_neighbouring_outlines_share_points() {
        let mut rng = SeededRandom::new(7);
        let (_, outlines) = partition_plane(10, &mut rng).unwrap();
        let shared = outlines[1..].iter().any(|p| p.borders(&outlines[0]));
        assert!(shared);
    }
}
