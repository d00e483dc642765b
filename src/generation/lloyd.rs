//! Lloyd's relaxation of the central seeds
//!
//! Moving a seed to the centre of its Voronoi cell evens out the cell shape.
//! The town only relaxes the few cells that matter visually: the ones nearest
//! the origin (plaza and its ring) and the citadel candidate.

use glam::DVec2;

use super::voronoi::Voronoi;
use crate::error::Result;
use crate::geom::PointId;

/// Options for Lloyd's relaxation
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Number of rebuild passes
    pub iterations: usize,
    /// How many seeds nearest the origin move on each pass
    pub central_seeds: usize,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            iterations: 3,
            central_seeds: 3,
        }
    }
}

/// Relax the central seeds and the seed ranked `extra` by distance
///
/// Each pass ranks the seeds by distance from the origin, relaxes the first
/// `options.central_seeds` of them plus the one at rank `extra`, and rebuilds.
pub fn relax_central(mut voronoi: Voronoi, extra: usize, options: LloydOptions) -> Result<Voronoi> {
    for iteration in 0..options.iterations {
        let subset = ranked_subset(&voronoi, options.central_seeds, extra);
        voronoi = voronoi.relax(Some(subset.as_slice()))?;
        log::trace!("lloyd pass {}: relaxed {} seeds", iteration + 1, subset.len());
    }
    Ok(voronoi)
}

fn ranked_subset(voronoi: &Voronoi, central: usize, extra: usize) -> Vec<PointId> {
    let arena = voronoi.arena();
    let mut ranked: Vec<(PointId, DVec2)> = voronoi.seeds().iter().map(|&id| (id, arena[id])).collect();
    ranked.sort_by(|a, b| a.1.length().total_cmp(&b.1.length()));

    let mut subset: Vec<PointId> = ranked.iter().take(central).map(|&(id, _)| id).collect();
    if let Some(&(id, _)) = ranked.get(extra) {
        if !subset.contains(&id) {
            subset.push(id);
        }
    }
    subset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::points::spiral_points;
    use crate::random::SeededRandom;

    #[test]
    fn test_relax_keeps_seed_count() {
        let mut rng = SeededRandom::new(42);
        let seeds = spiral_points(80, &mut rng);
        let voronoi = Voronoi::build(&seeds).unwrap();
        let relaxed = relax_central(voronoi, 10, LloydOptions::default()).unwrap();
        assert_eq!(relaxed.seeds().len(), 80);
    }

    #[test]
    fn test_ranked_subset() {
        let seeds = [
            DVec2::new(30.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 5.0),
            DVec2::new(-12.0, 0.0),
            DVec2::new(0.0, -20.0),
        ];
        let voronoi = Voronoi::build(&seeds).unwrap();
        let ids = voronoi.seeds();
        let subset = ranked_subset(&voronoi, 2, 3);
        assert_eq!(subset, vec![ids[1], ids[2], ids[4]]);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let seeds = spiral_points(30, &mut SeededRandom::new(1));
        let voronoi = Voronoi::build(&seeds).unwrap();
        let options = LloydOptions {
            iterations: 0,
            ..Default::default()
        };
        let same = relax_central(voronoi.clone(), 5, options).unwrap();
        assert_eq!(same.triangles(), voronoi.triangles());
    }
}
