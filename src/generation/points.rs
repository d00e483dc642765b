//! Spiral seed distribution
//!
//! Seeds are laid out on a sunflower-like spiral around the origin: the angle
//! advances with `sqrt(i)` and the radius grows linearly with a random
//! stretch, so the centre gets small dense patches and the outskirts get
//! large sparse ones.
//!
//! - Angle: `start + sqrt(i) * 5`
//! - Radius: `0` for the first seed, then `10 + i * (2 + rand)`

use glam::DVec2;
use std::f64::consts::PI;

use crate::random::RandomSource;

/// Angular step multiplier applied to `sqrt(i)`
const ANGLE_STEP: f64 = 5.0;

/// Radius of the first ring around the central seed
const BASE_RADIUS: f64 = 10.0;

/// Generate `count` seeds on the spiral
///
/// The first seed is always the origin. Draws one float for the start angle
/// and one per seed after the first.
pub fn spiral_points<R: RandomSource>(count: usize, rng: &mut R) -> Vec<DVec2> {
    let start = rng.float() * PI * 2.0;
    (0..count)
        .map(|i| {
            let a = start + (i as f64).sqrt() * ANGLE_STEP;
            let r = if i == 0 {
                0.0
            } else {
                BASE_RADIUS + i as f64 * (2.0 + rng.float())
            };
            DVec2::new(a.cos() * r, a.sin() * r)
        })
        .collect()
}
