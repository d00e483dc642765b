//! Polygon kernel over shared points
//!
//! A [`Polygon`] is a ring of [`PointId`]s. Cloning a polygon is a shallow
//! copy: the clone references the same points, so moving a point through the
//! arena is visible in both. [`Polygon::deep_copy`] allocates fresh points.
//!
//! Construction operations (`cut`, `shrink`, `buffer`, ...) expect
//! counter-clockwise rings (positive [`Polygon::area`]), which is what the
//! Voronoi regions and every constructor here produce.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_buf::buffer_polygon;
use glam::DVec2;
use std::f64::consts::PI;

use super::point::{PointArena, PointId};
use super::utils::{intersect_lines, rotate90, with_length};

const DELTA: f64 = 1e-6;

/// Closed ring of shared points
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<PointId>,
}

impl Polygon {
    pub fn new(vertices: Vec<PointId>) -> Self {
        Self { vertices }
    }

    /// Allocate fresh points for every position
    pub fn from_positions(arena: &mut PointArena, positions: &[DVec2]) -> Self {
        Self::new(positions.iter().map(|&p| arena.add(p)).collect())
    }

    /// Axis-aligned rectangle centred on the origin
    pub fn rect(arena: &mut PointArena, w: f64, h: f64) -> Self {
        Self::from_positions(
            arena,
            &[
                DVec2::new(-w / 2.0, -h / 2.0),
                DVec2::new(w / 2.0, -h / 2.0),
                DVec2::new(w / 2.0, h / 2.0),
                DVec2::new(-w / 2.0, h / 2.0),
            ],
        )
    }

    /// Regular `n`-gon of radius `r` centred on the origin
    pub fn regular(arena: &mut PointArena, n: usize, r: f64) -> Self {
        let positions: Vec<DVec2> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * PI * 2.0;
                DVec2::new(r * a.cos(), r * a.sin())
            })
            .collect();
        Self::from_positions(arena, &positions)
    }

    /// Sixteen-sided approximation of a circle
    pub fn circle(arena: &mut PointArena, r: f64) -> Self {
        Self::regular(arena, 16, r)
    }

    /// Copy that owns newly allocated points at the same positions
    pub fn deep_copy(&self, arena: &mut PointArena) -> Self {
        Self::new(self.vertices.iter().map(|&v| arena.add(arena.get(v))).collect())
    }

    // ----- identity queries -------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[PointId] {
        &self.vertices
    }

    #[inline]
    pub fn get(&self, i: usize) -> PointId {
        self.vertices[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = PointId> + '_ {
        self.vertices.iter().copied()
    }

    /// Edges as `(start, end)` pairs, wrapping around
    pub fn edges(&self) -> impl Iterator<Item = (PointId, PointId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    #[inline]
    pub fn index_of(&self, v: PointId) -> Option<usize> {
        self.vertices.iter().position(|&p| p == v)
    }

    #[inline]
    pub fn contains(&self, v: PointId) -> bool {
        self.vertices.contains(&v)
    }

    /// Index of the directed edge `a -> b`
    pub fn find_edge(&self, a: PointId, b: PointId) -> Option<usize> {
        let n = self.vertices.len();
        let i = self.index_of(a)?;
        (self.vertices[(i + 1) % n] == b).then_some(i)
    }

    #[inline]
    pub fn next_index(&self, i: usize) -> usize {
        (i + 1) % self.vertices.len()
    }

    #[inline]
    pub fn prev_index(&self, i: usize) -> usize {
        (i + self.vertices.len() - 1) % self.vertices.len()
    }

    pub fn next(&self, v: PointId) -> Option<PointId> {
        self.index_of(v).map(|i| self.vertices[self.next_index(i)])
    }

    pub fn prev(&self, v: PointId) -> Option<PointId> {
        self.index_of(v).map(|i| self.vertices[self.prev_index(i)])
    }

    /// Whether the two rings share an edge, in either direction
    pub fn borders(&self, other: &Polygon) -> bool {
        let n1 = self.len();
        let n2 = other.len();
        if n2 == 0 {
            return false;
        }
        (0..n1).any(|i| {
            other.index_of(self.vertices[i]).is_some_and(|j| {
                let next = self.vertices[(i + 1) % n1];
                next == other.vertices[(j + 1) % n2] || next == other.vertices[(j + n2 - 1) % n2]
            })
        })
    }

    // ----- ring edits -------------------------------------------------------

    #[inline]
    pub fn push(&mut self, v: PointId) {
        self.vertices.push(v);
    }

    #[inline]
    pub fn insert(&mut self, i: usize, v: PointId) {
        self.vertices.insert(i, v);
    }

    /// Remove the first occurrence of `v`
    pub fn remove(&mut self, v: PointId) -> bool {
        match self.index_of(v) {
            Some(i) => {
                self.vertices.remove(i);
                true
            }
            None => false,
        }
    }

    /// Substitute every occurrence of `old` with `new`
    pub fn replace(&mut self, old: PointId, new: PointId) {
        for v in self.vertices.iter_mut().filter(|v| **v == old) {
            *v = new;
        }
    }

    /// Drop repeated references, keeping the first occurrence
    pub fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.vertices.len());
        self.vertices.retain(|v| {
            if seen.contains(v) {
                false
            } else {
                seen.push(*v);
                true
            }
        });
    }

    /// Split along the chord between two shared vertices
    ///
    /// Both halves reference `a` and `b`. Returns `None` when either vertex is
    /// missing or they coincide.
    pub fn split(&self, a: PointId, b: PointId) -> Option<(Polygon, Polygon)> {
        let (mut i1, mut i2) = (self.index_of(a)?, self.index_of(b)?);
        if i1 == i2 {
            return None;
        }
        if i1 > i2 {
            std::mem::swap(&mut i1, &mut i2);
        }
        let first = Polygon::new(self.vertices[i1..=i2].to_vec());
        let mut rest = self.vertices[i2..].to_vec();
        rest.extend_from_slice(&self.vertices[..=i1]);
        Some((first, Polygon::new(rest)))
    }

    // ----- value queries ----------------------------------------------------

    pub fn positions(&self, arena: &PointArena) -> Vec<DVec2> {
        arena.positions(&self.vertices)
    }

    /// Signed area, positive for counter-clockwise rings
    pub fn area(&self, arena: &PointArena) -> f64 {
        let n = self.len();
        if n < 3 {
            return 0.0;
        }
        let mut s = 0.0;
        for (a, b) in self.edges() {
            let (p, q) = (arena[a], arena[b]);
            s += p.x * q.y - q.x * p.y;
        }
        s * 0.5
    }

    pub fn perimeter(&self, arena: &PointArena) -> f64 {
        self.edges().map(|(a, b)| arena[a].distance(arena[b])).sum()
    }

    /// `4 * pi * area / perimeter^2`; 1 for a circle, 0 for a degenerate ring
    pub fn compactness(&self, arena: &PointArena) -> f64 {
        let p = self.perimeter(arena);
        if p == 0.0 {
            return 0.0;
        }
        4.0 * PI * self.area(arena) / (p * p)
    }

    /// Average of the vertices
    pub fn center(&self, arena: &PointArena) -> DVec2 {
        if self.is_empty() {
            return DVec2::ZERO;
        }
        self.iter().map(|v| arena[v]).sum::<DVec2>() / self.len() as f64
    }

    /// Area centroid, falling back to [`Polygon::center`] for zero area
    pub fn centroid(&self, arena: &PointArena) -> DVec2 {
        let mut c = DVec2::ZERO;
        let mut a = 0.0;
        for (v0, v1) in self.edges() {
            let (p, q) = (arena[v0], arena[v1]);
            let f = p.x * q.y - q.x * p.y;
            a += f;
            c += (p + q) * f;
        }
        if a == 0.0 {
            return self.center(arena);
        }
        c / (3.0 * a)
    }

    /// Vector of the edge starting at vertex `i`
    pub fn vector(&self, arena: &PointArena, i: usize) -> DVec2 {
        arena[self.vertices[self.next_index(i)]] - arena[self.vertices[i]]
    }

    pub fn is_convex_vertex(&self, arena: &PointArena, i: usize) -> bool {
        let v0 = arena[self.vertices[self.prev_index(i)]];
        let v1 = arena[self.vertices[i]];
        let v2 = arena[self.vertices[self.next_index(i)]];
        (v1 - v0).perp_dot(v2 - v1) > 0.0
    }

    pub fn is_convex(&self, arena: &PointArena) -> bool {
        (0..self.len()).all(|i| self.is_convex_vertex(arena, i))
    }

    /// Position of vertex `i` pulled towards its neighbours
    ///
    /// `f` weighs the vertex itself; larger values smooth less.
    pub fn smooth_vertex(&self, arena: &PointArena, i: usize, f: f64) -> DVec2 {
        let prev = arena[self.vertices[self.prev_index(i)]];
        let v = arena[self.vertices[i]];
        let next = arena[self.vertices[self.next_index(i)]];
        (prev + v * f + next) / (2.0 + f)
    }

    /// Smoothed positions of every vertex, without moving anything
    pub fn smooth_vertex_eq(&self, arena: &PointArena, f: f64) -> Vec<DVec2> {
        (0..self.len()).map(|i| self.smooth_vertex(arena, i, f)).collect()
    }

    /// Smallest distance from `p` to any vertex
    pub fn distance(&self, arena: &PointArena, p: DVec2) -> f64 {
        self.iter()
            .map(|v| arena[v].distance(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Inverse-distance weights of every vertex relative to `p`, summing to 1
    pub fn interpolate(&self, arena: &PointArena, p: DVec2) -> Vec<f64> {
        let distances: Vec<f64> = self.iter().map(|v| arena[v].distance(p)).collect();
        if let Some(hit) = distances.iter().position(|&d| d == 0.0) {
            return (0..distances.len()).map(|i| if i == hit { 1.0 } else { 0.0 }).collect();
        }
        let sum: f64 = distances.iter().map(|d| 1.0 / d).sum();
        distances.iter().map(|d| 1.0 / d / sum).collect()
    }

    /// First vertex minimising `f` over positions
    pub fn min_by<F: FnMut(DVec2) -> f64>(&self, arena: &PointArena, mut f: F) -> Option<PointId> {
        let mut best = None;
        let mut best_value = f64::INFINITY;
        for v in self.iter() {
            let value = f(arena[v]);
            if best.is_none() || value < best_value {
                best = Some(v);
                best_value = value;
            }
        }
        best
    }

    /// First vertex maximising `f` over positions
    pub fn max_by<F: FnMut(DVec2) -> f64>(&self, arena: &PointArena, mut f: F) -> Option<PointId> {
        self.min_by(arena, |p| -f(p))
    }

    /// Index of the first vertex located exactly at `p`
    pub fn index_of_position(&self, arena: &PointArena, p: DVec2) -> Option<usize> {
        self.vertices.iter().position(|&v| arena[v] == p)
    }

    pub fn contains_position(&self, arena: &PointArena, p: DVec2) -> bool {
        self.index_of_position(arena, p).is_some()
    }

    /// Even-odd point-in-polygon test
    pub fn contains_point(&self, arena: &PointArena, p: DVec2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            let (a, b) = (arena[a], arena[b]);
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
        }
        inside
    }

    /// Axis-aligned bounds as `(min, max)`
    pub fn bounds(&self, arena: &PointArena) -> (DVec2, DVec2) {
        self.iter().fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(lo, hi), v| (lo.min(arena[v]), hi.max(arena[v])),
        )
    }

    // ----- in-place transforms ----------------------------------------------

    /// Translate every vertex (moves shared points)
    pub fn offset(&self, arena: &mut PointArena, d: DVec2) {
        for v in self.iter() {
            arena.set(v, arena[v] + d);
        }
    }

    /// Rotate every vertex around the origin (moves shared points)
    pub fn rotate(&self, arena: &mut PointArena, angle: f64) {
        let rot = DVec2::from_angle(angle);
        for v in self.iter() {
            arena.set(v, rot.rotate(arena[v]));
        }
    }

    // ----- constructive operations ------------------------------------------

    /// Cut along the line through `p1` and `p2`
    ///
    /// When the line crosses the ring exactly twice, returns the part on the
    /// left of `p1 -> p2` followed by the part on the right. A positive `gap`
    /// pulls both halves away from the cut by `gap / 2`, and a half thinner
    /// than that is dropped. Otherwise returns a single independent copy of
    /// the polygon.
    pub fn cut(&self, arena: &mut PointArena, p1: DVec2, p2: DVec2, gap: f64) -> Vec<Polygon> {
        let d1 = p2 - p1;
        let n = self.len();

        let mut hits: Vec<(usize, f64)> = Vec::with_capacity(2);
        for i in 0..n {
            let v0 = arena[self.vertices[i]];
            let v1 = arena[self.vertices[(i + 1) % n]];
            if let Some((t1, t2)) = intersect_lines(p1, d1, v0, v1 - v0) {
                if (0.0..1.0).contains(&t2) {
                    hits.push((i, t1));
                }
            }
        }

        if hits.len() != 2 {
            return vec![self.deep_copy(arena)];
        }
        let (edge1, ratio1) = hits[0];
        let (edge2, ratio2) = hits[1];

        let point1 = arena.add(p1 + d1 * ratio1);
        let point2 = arena.add(p1 + d1 * ratio2);

        let mut half1 = vec![point1];
        half1.extend_from_slice(&self.vertices[edge1 + 1..=edge2]);
        half1.push(point2);
        let mut half1 = Polygon::new(half1);

        let mut half2 = vec![point2];
        half2.extend_from_slice(&self.vertices[edge2 + 1..]);
        half2.extend_from_slice(&self.vertices[..=edge1]);
        half2.push(point1);
        let mut half2 = Polygon::new(half2);

        if gap > 0.0 {
            half1 = half1.peel(arena, half1.len() - 1, gap / 2.0);
            half2 = half2.peel(arena, half2.len() - 1, gap / 2.0);
        }

        let v = self.vector(arena, edge1);
        let halves = if d1.perp_dot(v) > 0.0 {
            vec![half1, half2]
        } else {
            vec![half2, half1]
        };
        halves.into_iter().filter(|h| !h.is_empty()).collect()
    }

    /// Move the edge starting at vertex `i` inwards by `d`
    ///
    /// Empty when the moved edge passes the whole ring.
    pub fn peel(&self, arena: &mut PointArena, i: usize, d: f64) -> Polygon {
        let v1 = arena[self.vertices[i]];
        let v2 = arena[self.vertices[self.next_index(i)]];
        let n = with_length(rotate90(v2 - v1), d);
        self.clip(arena, v1 + n, v2 + n)
    }

    /// Part of the polygon left of the line through `p1` and `p2`
    ///
    /// A ring entirely on the left comes back as a shallow copy, one entirely
    /// on the right as an empty polygon.
    fn clip(&self, arena: &mut PointArena, p1: DVec2, p2: DVec2) -> Polygon {
        let dir = (p2 - p1).normalize_or_zero();
        let sides: Vec<f64> = self.iter().map(|v| dir.perp_dot(arena[v] - p1)).collect();
        if sides.iter().all(|&s| s >= -DELTA) {
            return self.clone();
        }
        if sides.iter().all(|&s| s <= DELTA) {
            return Polygon::default();
        }
        self.cut(arena, p1, p2, 0.0).swap_remove(0)
    }

    /// Inset by per-edge distances using half-plane cuts
    ///
    /// Exact for convex rings; `distances[i]` applies to the edge starting at
    /// vertex `i`, zero or negative entries leave the edge alone. Insets that
    /// meet across the polygon leave it empty.
    pub fn shrink(&self, arena: &mut PointArena, distances: &[f64]) -> Polygon {
        let mut q = self.clone();
        for (i, (a, b)) in self.edges().enumerate() {
            let d = distances.get(i).copied().unwrap_or(0.0);
            if d > 0.0 {
                let (v1, v2) = (arena[a], arena[b]);
                let n = with_length(rotate90(v2 - v1), d);
                q = q.clip(arena, v1 + n, v2 + n);
                if q.is_empty() {
                    break;
                }
            }
        }
        q
    }

    pub fn shrink_eq(&self, arena: &mut PointArena, d: f64) -> Polygon {
        self.shrink(arena, &vec![d; self.len()])
    }

    /// Offset every edge outwards by its distance, negative values inset
    ///
    /// A uniform distance is applied as a straight-skeleton offset with mitred
    /// corners. Mixed distances add or subtract a strip along every edge, with
    /// bevelled corners between strips of the same side. The largest piece of
    /// the result is kept and an offset that swallows the polygon returns an
    /// empty one. Endpoints of zero-distance edges keep their shared points.
    pub fn buffer(&self, arena: &mut PointArena, distances: &[f64]) -> Polygon {
        let n = self.len();
        if n < 3 {
            return Polygon::default();
        }
        let dist: Vec<f64> = (0..n).map(|i| distances.get(i).copied().unwrap_or(0.0)).collect();
        if dist.iter().all(|&d| d == 0.0) {
            return self.clone();
        }

        let shape = self.to_geo(arena);
        let result = if dist.iter().all(|&d| d == dist[0]) {
            buffer_polygon(&shape, dist[0])
        } else {
            let positions = self.positions(arena);
            let offsets: Vec<DVec2> = (0..n)
                .map(|i| with_length(rotate90(positions[(i + 1) % n] - positions[i]), -dist[i]))
                .collect();

            let mut grow = MultiPolygon::new(vec![shape]);
            let mut carve = MultiPolygon::new(Vec::new());
            for i in 0..n {
                if dist[i] == 0.0 {
                    continue;
                }
                let (a, b) = (positions[i], positions[(i + 1) % n]);
                let o = offsets[i];
                let mut pieces = vec![geo_ring(&[a, b, b + o, a + o])];

                let prev = (i + n - 1) % n;
                if dist[prev] * dist[i] > 0.0 {
                    pieces.push(geo_ring(&[a, a + offsets[prev], a + o]));
                }
                for piece in pieces {
                    let piece = MultiPolygon::new(vec![piece]);
                    if dist[i] > 0.0 {
                        grow = grow.union(&piece);
                    } else {
                        carve = carve.union(&piece);
                    }
                }
            }
            grow.difference(&carve)
        };

        let Some(best) = result
            .into_iter()
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
        else {
            return Polygon::default();
        };
        if best.unsigned_area() <= DELTA {
            return Polygon::default();
        }

        let mut positions: Vec<DVec2> = best
            .exterior()
            .coords()
            .map(|c| DVec2::new(c.x, c.y))
            .collect();
        if positions.len() > 1 && positions.first() == positions.last() {
            positions.pop();
        }

        let anchors: Vec<PointId> = self
            .edges()
            .zip(&dist)
            .filter(|(_, &d)| d == 0.0)
            .flat_map(|((a, b), _)| [a, b])
            .collect();
        let vertices = positions
            .iter()
            .map(|&p| {
                anchors
                    .iter()
                    .copied()
                    .find(|&a| arena[a].distance(p) < DELTA)
                    .unwrap_or_else(|| arena.add(p))
            })
            .collect();
        let mut q = Polygon::new(vertices);
        q.dedup();
        if q.len() < 3 {
            return Polygon::default();
        }
        if q.area(arena) < 0.0 {
            q.vertices.reverse();
        }
        q
    }

    pub fn buffer_eq(&self, arena: &mut PointArena, d: f64) -> Polygon {
        self.buffer(arena, &vec![d; self.len()])
    }

    fn to_geo(&self, arena: &PointArena) -> GeoPolygon<f64> {
        geo_ring(&self.positions(arena))
    }
}

fn geo_ring(points: &[DVec2]) -> GeoPolygon<f64> {
    let coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    GeoPolygon::new(LineString::from(coords), Vec::new())
}
