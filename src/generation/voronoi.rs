//! Incremental Delaunay triangulation and its Voronoi regions
//!
//! Points are inserted one at a time into a triangulation bootstrapped from a
//! padded rectangular frame. Every circumcenter is stored once in the
//! triangulation's [`PointArena`], so neighbouring regions share the exact
//! same corner points.

use glam::DVec2;
use std::cmp::Ordering;

use crate::error::{Result, TownError};
use crate::geom::{PointArena, PointId, Polygon};

/// Delaunay triangle with a shared circumcenter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p1: PointId,
    pub p2: PointId,
    pub p3: PointId,
    /// Circumcenter, a corner of the Voronoi regions of all three vertices
    pub c: PointId,
    /// Circumradius
    pub r: f64,
}

impl Triangle {
    /// Counter-clockwise triangle over three stored points
    ///
    /// # Errors
    ///
    /// Returns `DegenerateTriangle` when the points are collinear or coincide.
    fn new(arena: &mut PointArena, p1: PointId, p2: PointId, p3: PointId) -> Result<Self> {
        let (a, b, c) = (arena[p1], arena[p2], arena[p3]);
        let (p2, p3) = if (b - a).perp_dot(c - a) > 0.0 {
            (p2, p3)
        } else {
            (p3, p2)
        };
        let center = circumcenter(a, b, c)?;
        let r = center.distance(a);
        Ok(Self {
            p1,
            p2,
            p3,
            c: arena.add(center),
            r,
        })
    }

    /// Whether the directed edge `a -> b` belongs to this triangle
    #[inline]
    pub fn has_edge(&self, a: PointId, b: PointId) -> bool {
        (self.p1 == a && self.p2 == b) || (self.p2 == a && self.p3 == b) || (self.p3 == a && self.p1 == b)
    }

    #[inline]
    pub fn edges(&self) -> [(PointId, PointId); 3] {
        [(self.p1, self.p2), (self.p2, self.p3), (self.p3, self.p1)]
    }

    #[inline]
    pub fn has_vertex(&self, v: PointId) -> bool {
        self.p1 == v || self.p2 == v || self.p3 == v
    }
}

/// Circumcenter from the determinant form of the perpendicular bisectors
///
/// Has no axis-aligned special case; only collinear input fails.
fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> Result<DVec2> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let scale = (b - a).length() * (c - a).length();
    if d == 0.0 || d.abs() <= 2e-12 * scale {
        return Err(TownError::DegenerateTriangle {
            a: a.to_array(),
            b: b.to_array(),
            c: c.to_array(),
        });
    }
    let (la, lb, lc) = (a.length_squared(), b.length_squared(), c.length_squared());
    let ux = (la * (b.y - c.y) + lb * (c.y - a.y) + lc * (a.y - b.y)) / d;
    let uy = (la * (c.x - b.x) + lb * (a.x - c.x) + lc * (b.x - a.x)) / d;
    Ok(DVec2::new(ux, uy))
}

/// One Voronoi cell: a seed and its incident triangles in angular order
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub seed: PointId,
    pub triangles: Vec<Triangle>,
}

impl Region {
    /// Cell outline through the shared circumcenters
    pub fn polygon(&self) -> Polygon {
        Polygon::new(self.triangles.iter().map(|t| t.c).collect())
    }

    /// Average of the cell corners
    pub fn center(&self, arena: &PointArena) -> DVec2 {
        if self.triangles.is_empty() {
            return arena[self.seed];
        }
        self.triangles.iter().map(|t| arena[t.c]).sum::<DVec2>() / self.triangles.len() as f64
    }

    /// Whether two cells share a corner
    pub fn borders(&self, other: &Region) -> bool {
        self.triangles
            .iter()
            .any(|t| other.triangles.iter().any(|o| o.c == t.c))
    }
}

/// Incremental Delaunay triangulation with cached Voronoi regions
///
/// # Example
///
/// ```
/// use rust_voronoi_town::Voronoi;
/// use glam::DVec2;
///
/// let seeds = [
///     DVec2::new(0.0, 0.0),
///     DVec2::new(10.0, 1.0),
///     DVec2::new(3.0, 9.0),
///     DVec2::new(-7.0, 4.0),
///     DVec2::new(-2.0, -8.0),
/// ];
/// let mut voronoi = Voronoi::build(&seeds).unwrap();
/// assert_eq!(voronoi.seeds().len(), 5);
/// // only the central seed has a cell clear of the frame
/// assert_eq!(voronoi.partitioning().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Voronoi {
    arena: PointArena,
    triangles: Vec<Triangle>,
    points: Vec<PointId>,
    frame: [PointId; 4],
    regions: Vec<Region>,
    regions_dirty: bool,
}

impl Voronoi {
    /// Empty triangulation covering the rectangle `min..max`
    pub fn new(min: DVec2, max: DVec2) -> Result<Self> {
        let mut arena = PointArena::new();
        let c1 = arena.add(DVec2::new(min.x, min.y));
        let c2 = arena.add(DVec2::new(min.x, max.y));
        let c3 = arena.add(DVec2::new(max.x, min.y));
        let c4 = arena.add(DVec2::new(max.x, max.y));
        let t1 = Triangle::new(&mut arena, c1, c2, c3)?;
        let t2 = Triangle::new(&mut arena, c2, c3, c4)?;

        Ok(Self {
            arena,
            triangles: vec![t1, t2],
            points: vec![c1, c2, c3, c4],
            frame: [c1, c2, c3, c4],
            regions: Vec::new(),
            regions_dirty: true,
        })
    }

    /// Triangulate `seeds` inside a frame padded by a quarter of their extent
    /// on every side
    pub fn build(seeds: &[DVec2]) -> Result<Self> {
        if seeds.is_empty() {
            return Err(TownError::InvalidConfig("no seed points to triangulate".into()));
        }
        let (mut min, mut max) = (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY));
        for &p in seeds {
            min = min.min(p);
            max = max.max(p);
        }
        let pad = ((max - min) * 0.5).max(DVec2::ONE);

        let mut voronoi = Self::new(min - pad / 2.0, max + pad / 2.0)?;
        for &p in seeds {
            voronoi.add_point(p)?;
        }
        log::trace!(
            "triangulated {} seeds into {} triangles",
            seeds.len(),
            voronoi.triangles.len()
        );
        Ok(voronoi)
    }

    /// Insert a point, re-triangulating the cavity of circumcircles it falls in
    ///
    /// # Errors
    ///
    /// `BrokenBoundary` when the cavity boundary is not one closed loop (a
    /// duplicate point or one outside the frame), `DegenerateTriangle` when a
    /// new triangle would be flat. The triangulation is left unchanged on error.
    pub fn add_point(&mut self, p: DVec2) -> Result<PointId> {
        let broken = || TownError::BrokenBoundary { x: p.x, y: p.y };
        if self.points.iter().any(|&q| self.arena[q] == p) {
            return Err(broken());
        }

        let hole: Vec<usize> = self
            .triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| self.arena[t.c].distance(p) < t.r)
            .map(|(i, _)| i)
            .collect();
        if hole.is_empty() {
            return Err(broken());
        }

        // Edges of the cavity: not shared (reversed) with another cavity triangle
        let mut boundary: Vec<(PointId, PointId)> = Vec::new();
        for &i in &hole {
            let t = self.triangles[i];
            for (a, b) in t.edges() {
                let shared = hole
                    .iter()
                    .any(|&j| j != i && self.triangles[j].has_edge(b, a));
                if !shared {
                    boundary.push((a, b));
                }
            }
        }

        let id = self.arena.add(p);
        let mut created = Vec::with_capacity(boundary.len());
        let mut index = 0;
        loop {
            let (a, b) = boundary[index];
            created.push(Triangle::new(&mut self.arena, id, a, b)?);
            index = boundary.iter().position(|&(s, _)| s == b).ok_or_else(broken)?;
            if index == 0 || created.len() > boundary.len() {
                break;
            }
        }
        if index != 0 || created.len() != boundary.len() {
            return Err(broken());
        }

        let mut k = 0;
        self.triangles.retain(|_| {
            let keep = !hole.contains(&k);
            k += 1;
            keep
        });
        self.triangles.extend(created);
        self.points.push(id);
        self.regions_dirty = true;
        Ok(id)
    }

    /// Rebuild from scratch after moving seeds to their cell centers
    ///
    /// Only seeds listed in `subset` move (all of them when `None`); moved
    /// seeds are appended after the unmoved ones. Cells touching the frame
    /// never move.
    pub fn relax(&mut self, subset: Option<&[PointId]>) -> Result<Voronoi> {
        let moved: Vec<(PointId, DVec2)> = self
            .partitioning()
            .iter()
            .filter(|r| subset.map_or(true, |s| s.contains(&r.seed)))
            .map(|r| (r.seed, r.center(&self.arena)))
            .collect();

        let mut seeds: Vec<DVec2> = self
            .seeds()
            .iter()
            .filter(|id| !moved.iter().any(|(m, _)| m == *id))
            .map(|&id| self.arena[id])
            .collect();
        seeds.extend(moved.iter().map(|&(_, c)| c));
        Voronoi::build(&seeds)
    }

    /// Shared storage for seeds, frame corners and circumcenters
    #[inline]
    pub fn arena(&self) -> &PointArena {
        &self.arena
    }

    /// Give up the triangulation, keeping the stored points
    pub fn into_arena(self) -> PointArena {
        self.arena
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Inserted points in insertion order, without the frame corners
    #[inline]
    pub fn seeds(&self) -> &[PointId] {
        &self.points[4..]
    }

    #[inline]
    pub fn frame(&self) -> &[PointId; 4] {
        &self.frame
    }

    /// A triangle is real when it does not touch the frame
    pub fn is_real(&self, t: &Triangle) -> bool {
        !self.frame.iter().any(|&f| t.has_vertex(f))
    }

    /// Regions of every point, frame corners included, in insertion order
    pub fn regions(&mut self) -> &[Region] {
        if self.regions_dirty {
            self.regions = self.points.iter().map(|&p| self.build_region(p)).collect();
            self.regions_dirty = false;
        }
        &self.regions
    }

    /// Regions of seeds whose triangles are all real, in insertion order
    pub fn partitioning(&mut self) -> Vec<Region> {
        self.regions();
        self.regions
            .iter()
            .skip(4)
            .filter(|r| r.triangles.iter().all(|t| self.is_real(t)))
            .cloned()
            .collect()
    }

    fn build_region(&self, seed: PointId) -> Region {
        let origin = self.arena[seed];
        let mut keyed: Vec<(f64, f64, Triangle)> = self
            .triangles
            .iter()
            .filter(|t| t.has_vertex(seed))
            .map(|t| {
                let d = self.arena[t.c] - origin;
                (d.y.atan2(d.x), d.y, *t)
            })
            .collect();
        keyed.sort_by(|a, b| match a.0.total_cmp(&b.0) {
            Ordering::Equal => a.1.total_cmp(&b.1),
            other => other,
        });
        Region {
            seed,
            triangles: keyed.into_iter().map(|(_, _, t)| t).collect(),
        }
    }
}
