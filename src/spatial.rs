//! Spatial indexing for nearest-vertex lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Wrapper around a KD-tree over 2D positions
///
/// Provides O(log n) nearest-neighbour lookups from a position to the index of
/// the closest stored point. Used to find the routing vertex nearest to a
/// point far outside the town when laying out roads.
///
/// # Example
///
/// ```
/// use rust_voronoi_town::{DVec2, SpatialIndex};
///
/// let points = vec![
///     DVec2::new(0.0, 0.0),
///     DVec2::new(10.0, 0.0),
///     DVec2::new(0.0, 10.0),
/// ];
///
/// let index = SpatialIndex::new(&points);
/// assert_eq!(index.find_nearest(DVec2::new(9.0, 1.0)), Some(1));
/// ```
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
}

impl SpatialIndex {
    /// Build an index over `points`; indices refer to positions in the slice
    pub fn new(points: &[DVec2]) -> Self {
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        let tree = (!entries.is_empty()).then(|| ImmutableKdTree::new_from_slice(&entries));
        Self { tree }
    }

    /// Index of the stored point closest to `position`, `None` when empty
    pub fn find_nearest(&self, position: DVec2) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        Some(result.item)
    }
}
