//! Recursive block subdivision into building footprints
//!
//! Both routines keep an explicit stack instead of recursing. Work items are
//! pushed in reverse so halves are finished in the same order (and with the
//! same random draws) as a depth-first recursion would.

use glam::DVec2;
use std::f64::consts::PI;

use super::AlleyParams;
use crate::building::cutter::bisect;
use crate::building::ALLEY;
use crate::geom::utils::{interpolate, rotate90};
use crate::geom::{PointArena, PointId, Polygon};
use crate::random::RandomSource;

/// Attempts before an ortho layout keeps the whole block
const MAX_ORTHO_ATTEMPTS: usize = 100;

enum Work {
    /// Fresh half, decide whether it is small enough
    Check(Polygon),
    /// Block to cut, with or without an alley in the cut
    Split(Polygon, bool),
}

/// Cut `block` into buildings separated by alleys
///
/// Each cut goes through the longest edge at a randomised position and angle.
/// Blocks below a randomised share of `params.min_area` become buildings,
/// some of which are dropped per `params.empty_probability`.
pub fn create_alleys<R: RandomSource>(
    arena: &mut PointArena,
    block: &Polygon,
    params: &AlleyParams,
    rng: &mut R,
) -> Vec<Polygon> {
    if params.min_area <= 0.0 {
        return vec![block.clone()];
    }
    let mut buildings = Vec::new();
    let mut stack = vec![Work::Split(block.clone(), true)];

    while let Some(item) = stack.pop() {
        match item {
            Work::Check(half) => {
                let area = half.area(arena);
                let threshold = params.min_area * 2f64.powf(4.0 * params.size_chaos * (rng.float() - 0.5));
                if area < threshold {
                    if !rng.bool(params.empty_probability) {
                        buildings.push(half);
                    }
                } else {
                    let split = area > params.min_area / (rng.float() * rng.float());
                    stack.push(Work::Split(half, split));
                }
            }
            Work::Split(poly, split) => {
                let Some(v) = longest_edge(arena, &poly) else {
                    continue;
                };
                let spread = 0.8 * params.grid_chaos;
                let ratio = (1.0 - spread) / 2.0 + rng.float() * spread;
                let angle_spread = if poly.area(arena) < params.min_area * 4.0 {
                    0.0
                } else {
                    PI / 6.0 * params.grid_chaos
                };
                let angle = (rng.float() - 0.5) * angle_spread;
                let gap = if split { ALLEY } else { 0.0 };

                let halves = bisect(arena, &poly, v, ratio, angle, gap);
                if halves.len() < 2 {
                    // missed cut or a half lost to the alley
                    buildings.extend(halves);
                    continue;
                }
                stack.extend(halves.into_iter().rev().map(Work::Check));
            }
        }
    }
    buildings
}

/// Cut `block` into rectangular-ish buildings aligned with its longest edge
///
/// Blocks smaller than `min_block_area` are returned whole. Otherwise the
/// block is sliced until pieces fall under a randomised threshold; each piece
/// is kept with chance `fill`. Slicing repeats until something is kept.
pub fn create_ortho_building<R: RandomSource>(
    arena: &mut PointArena,
    block: &Polygon,
    min_block_area: f64,
    fill: f64,
    rng: &mut R,
) -> Vec<Polygon> {
    if min_block_area <= 0.0 || block.area(arena) < min_block_area {
        return vec![block.clone()];
    }
    let Some(v) = longest_edge(arena, block) else {
        return vec![block.clone()];
    };
    let c1 = block.vector(arena, block.index_of(v).unwrap_or(0));
    let c2 = rotate90(c1);

    for _ in 0..MAX_ORTHO_ATTEMPTS {
        let buildings = ortho_slices(arena, block, min_block_area, fill, (c1, c2), rng);
        if !buildings.is_empty() {
            return buildings;
        }
    }
    log::trace!("ortho layout kept nothing, using the whole block");
    vec![block.clone()]
}

fn ortho_slices<R: RandomSource>(
    arena: &mut PointArena,
    block: &Polygon,
    min_block_area: f64,
    fill: f64,
    (c1, c2): (DVec2, DVec2),
    rng: &mut R,
) -> Vec<Polygon> {
    let mut buildings = Vec::new();
    let mut stack = vec![Work::Split(block.clone(), false)];

    while let Some(item) = stack.pop() {
        match item {
            Work::Check(half) => {
                if half.area(arena) < min_block_area * 2f64.powf(rng.normal() * 2.0 - 1.0) {
                    if rng.bool(fill) {
                        buildings.push(half);
                    }
                } else {
                    stack.push(Work::Split(half, false));
                }
            }
            Work::Split(poly, _) => {
                let Some(v0) = longest_edge(arena, &poly) else {
                    continue;
                };
                let Some(v1) = poly.next(v0) else {
                    continue;
                };
                let (a, b) = (arena[v0], arena[v1]);
                let v = b - a;
                let ratio = 0.4 + rng.float() * 0.2;
                let p1 = interpolate(a, b, ratio);
                // cut along whichever axis is closer to perpendicular to the edge
                let c = if v.dot(c1).abs() < v.dot(c2).abs() { c1 } else { c2 };

                let halves = poly.cut(arena, p1, p1 + c, 0.0);
                if halves.len() < 2 {
                    if rng.bool(fill) {
                        buildings.push(poly);
                    }
                    continue;
                }
                stack.extend(halves.into_iter().rev().map(Work::Check));
            }
        }
    }
    buildings
}

/// First vertex of the longest edge
fn longest_edge(arena: &PointArena, poly: &Polygon) -> Option<PointId> {
    let mut best = None;
    let mut length = -1.0;
    for (v0, v1) in poly.edges() {
        let len = arena[v0].distance(arena[v1]);
        if len > length {
            length = len;
            best = Some(v0);
        }
    }
    best
}
