//! Line and vector helpers on plain positions.

use glam::DVec2;

/// Intersection parameters of two parametric lines
///
/// Line 1 is `p1 + t1 * d1`, line 2 is `p2 + t2 * d2`. Returns `(t1, t2)`,
/// or `None` for parallel lines.
pub fn intersect_lines(p1: DVec2, d1: DVec2, p2: DVec2, d2: DVec2) -> Option<(f64, f64)> {
    let d = d1.x * d2.y - d1.y * d2.x;
    if d == 0.0 {
        return None;
    }
    let t2 = (d1.y * (p2.x - p1.x) - d1.x * (p2.y - p1.y)) / d;
    let t1 = if d1.x != 0.0 {
        (p2.x - p1.x + d2.x * t2) / d1.x
    } else {
        (p2.y - p1.y + d2.y * t2) / d1.y
    };
    Some((t1, t2))
}

/// Point at `ratio` along `a -> b`
#[inline]
pub fn interpolate(a: DVec2, b: DVec2, ratio: f64) -> DVec2 {
    a + (b - a) * ratio
}

/// Signed distance from `p` to the line through `origin` with direction `dir`
///
/// Positive on the left of the direction.
#[inline]
pub fn distance_to_line(origin: DVec2, dir: DVec2, p: DVec2) -> f64 {
    (dir.x * p.y - dir.y * p.x + (origin.y + dir.y) * origin.x - (origin.x + dir.x) * origin.y)
        / dir.length()
}

/// Left-hand normal, `(x, y) -> (-y, x)`
#[inline]
pub fn rotate90(v: DVec2) -> DVec2 {
    DVec2::new(-v.y, v.x)
}

/// Rescale `v` to `length`; zero vectors stay zero
#[inline]
pub fn with_length(v: DVec2, length: f64) -> DVec2 {
    v.normalize_or_zero() * length
}
