//! Polygon subdivision helpers used by the ward layouts

use glam::DVec2;

use crate::geom::utils::{interpolate, rotate90, with_length};
use crate::geom::{PointArena, PointId, Polygon};

/// Slices peeled off a polygon boundary and what is left inside
#[derive(Debug, Clone, Default)]
pub struct Ring {
    pub slices: Vec<Polygon>,
    pub inner: Polygon,
}

/// Cut `poly` through the edge starting at `vertex`
///
/// The cut crosses the edge at `ratio` along it, perpendicular to the edge and
/// then turned by `angle`. Returns the polygon unchanged (as a copy) when
/// `vertex` is not part of it.
pub fn bisect(
    arena: &mut PointArena,
    poly: &Polygon,
    vertex: PointId,
    ratio: f64,
    angle: f64,
    gap: f64,
) -> Vec<Polygon> {
    let Some(next) = poly.next(vertex) else {
        return vec![poly.deep_copy(arena)];
    };
    let (v, n) = (arena[vertex], arena[next]);
    let p1 = interpolate(v, n, ratio);
    let d = DVec2::from_angle(angle).rotate(n - v);
    let p2 = p1 + rotate90(d);
    poly.cut(arena, p1, p2, gap)
}

/// Fan of triangles from `center` (the centroid by default) to every edge
pub fn radial(arena: &mut PointArena, poly: &Polygon, center: Option<DVec2>, gap: f64) -> Vec<Polygon> {
    let center = center.unwrap_or_else(|| poly.centroid(arena));
    let c = arena.add(center);
    let edges: Vec<(PointId, PointId)> = poly.edges().collect();
    edges
        .into_iter()
        .map(|(v0, v1)| {
            let sector = Polygon::new(vec![c, v0, v1]);
            if gap > 0.0 {
                sector.shrink(arena, &[gap / 2.0, 0.0, gap / 2.0])
            } else {
                sector
            }
        })
        .filter(|sector| !sector.is_empty())
        .collect()
}

/// Fan of triangles from one of the polygon's own vertices
///
/// Defaults to the vertex nearest the centroid. Edges touching the centre
/// vertex produce no sector; the gap is only left along internal cuts.
pub fn semi_radial(
    arena: &mut PointArena,
    poly: &Polygon,
    center: Option<PointId>,
    gap: f64,
) -> Vec<Polygon> {
    let center = match center {
        Some(c) => c,
        None => {
            let centroid = poly.centroid(arena);
            match poly.min_by(arena, |p| p.distance(centroid)) {
                Some(c) => c,
                None => return Vec::new(),
            }
        }
    };

    let half = gap / 2.0;
    let edges: Vec<(PointId, PointId)> = poly.edges().collect();
    let mut sectors = Vec::new();
    for (v0, v1) in edges {
        if v0 == center || v1 == center {
            continue;
        }
        let sector = Polygon::new(vec![center, v0, v1]);
        if half > 0.0 {
            let d = [
                if poly.find_edge(center, v0).is_none() { half } else { 0.0 },
                0.0,
                if poly.find_edge(v1, center).is_none() { half } else { 0.0 },
            ];
            let sector = sector.shrink(arena, &d);
            if !sector.is_empty() {
                sectors.push(sector);
            }
        } else {
            sectors.push(sector);
        }
    }
    sectors
}

/// Peel slices of `thickness` off every edge, shortest edge first
///
/// Works on a deep copy, so `poly` and its neighbours are left alone.
pub fn ring(arena: &mut PointArena, poly: &Polygon, thickness: f64) -> Ring {
    let mut cuts: Vec<(DVec2, DVec2, f64)> = poly
        .edges()
        .map(|(v1, v2)| {
            let (a, b) = (arena[v1], arena[v2]);
            let n = with_length(rotate90(b - a), thickness);
            (a + n, b + n, a.distance(b))
        })
        .collect();
    cuts.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut inner = poly.deep_copy(arena);
    let mut slices = Vec::new();
    for (p1, p2, _) in cuts {
        let mut halves = inner.cut(arena, p1, p2, 0.0).into_iter();
        if let Some(rest) = halves.next() {
            inner = rest;
        }
        slices.extend(halves);
    }
    Ring { slices, inner }
}
