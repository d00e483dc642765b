//! Curtain walls around a set of patches
//!
//! A wall follows the outer rim of the patches it encloses and shares the rim
//! points with them. Gates are rim vertices; the wall segment leaving a gate
//! is the opening, every other segment is masonry.

use glam::DVec2;
use std::f64::consts::FRAC_PI_2;

use super::patch::{find_circumference, patches_by_vertex, radius_of, Patch};
use crate::error::{Result, TownError};
use crate::geom::{PointArena, PointId, Polygon};
use crate::random::RandomSource;

/// Corners sharper than this never get a gate while blunter ones remain
const MIN_GATE_ANGLE: f64 = FRAC_PI_2;

/// Wall shape, opening flags, gates and towers
#[derive(Debug, Clone, PartialEq)]
pub struct CurtainWall {
    /// Rim of the enclosed patches
    pub shape: Polygon,
    /// `segments[i]` is true when the edge starting at vertex `i` is masonry
    pub segments: Vec<bool>,
    /// Gate vertices, shared with `shape`
    pub gates: Vec<PointId>,
    /// Tower positions
    pub towers: Vec<DVec2>,
    real: bool,
    patches: Vec<usize>,
}

impl CurtainWall {
    /// Build a wall around `enclosed` and choose its gates
    ///
    /// `reserved` vertices are neither smoothed nor used as gates. A real wall
    /// smooths its rim and may split a lone outside patch at a gate so a road
    /// can lead away from it; the second half is appended to `patches` with
    /// the flags of the patch it came from.
    ///
    /// # Errors
    ///
    /// `LayoutRejected` when the rim does not close or has no usable gate
    /// vertex.
    pub(crate) fn new<R: RandomSource>(
        real: bool,
        arena: &mut PointArena,
        patches: &mut Vec<Patch>,
        enclosed: &[usize],
        reserved: &[PointId],
        rng: &mut R,
    ) -> Result<Self> {
        let shape = find_circumference(patches, enclosed)
            .filter(|s| s.len() >= 3)
            .ok_or_else(|| TownError::rejected("bad walled area shape"))?;

        if real {
            let factor = (40.0 / shape.len() as f64).min(1.0);
            let smoothed: Vec<(PointId, DVec2)> = (0..shape.len())
                .filter(|&i| !reserved.contains(&shape.get(i)))
                .map(|i| (shape.get(i), shape.smooth_vertex(arena, i, factor)))
                .collect();
            for (v, p) in smoothed {
                arena.set(v, p);
            }
        }

        let mut wall = Self {
            segments: vec![true; shape.len()],
            shape,
            gates: Vec::new(),
            towers: Vec::new(),
            real,
            patches: enclosed.to_vec(),
        };
        wall.build_gates(arena, patches, reserved, rng)?;
        Ok(wall)
    }

    fn build_gates<R: RandomSource>(
        &mut self,
        arena: &mut PointArena,
        patches: &mut Vec<Patch>,
        reserved: &[PointId],
        rng: &mut R,
    ) -> Result<()> {
        // A gate needs more than one enclosed patch so a street can reach it
        let candidates: Vec<usize> = (0..self.shape.len())
            .filter(|&i| {
                let v = self.shape.get(i);
                !reserved.contains(&v)
                    && (self.patches.len() == 1
                        || self
                            .patches
                            .iter()
                            .filter(|&&p| patches[p].shape.contains(v))
                            .count()
                            > 1)
            })
            .collect();
        let blunt: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| !self.is_sharp_corner(arena, i))
            .collect();
        let mut entrances: Vec<PointId> = if blunt.is_empty() { candidates } else { blunt }
            .into_iter()
            .map(|i| self.shape.get(i))
            .collect();
        if entrances.is_empty() {
            return Err(TownError::rejected("bad walled area shape"));
        }

        loop {
            let index = rng.int(0, entrances.len());
            let gate = entrances[index];
            self.gates.push(gate);

            if self.real {
                self.split_outer_patch(arena, patches, reserved, gate);
            }

            // Drop the neighbouring entrances so gates keep apart
            if index == 0 {
                entrances.drain(0..entrances.len().min(2));
                entrances.pop();
            } else if index == entrances.len() - 1 {
                entrances.drain(index - 1..);
                if !entrances.is_empty() {
                    entrances.remove(0);
                }
            } else {
                entrances.drain(index - 1..index + 2);
            }
            if entrances.len() < 3 {
                break;
            }
        }

        if self.real {
            for &gate in &self.gates {
                if let Some(i) = self.shape.index_of(gate) {
                    let p = self.shape.smooth_vertex(arena, i, 1.0);
                    arena.set(gate, p);
                }
            }
        }
        for &gate in &self.gates {
            if let Some(i) = self.shape.index_of(gate) {
                self.segments[i] = false;
            }
        }
        log::debug!(
            "wall with {} vertices, {} gates",
            self.shape.len(),
            self.gates.len()
        );
        Ok(())
    }

    fn is_sharp_corner(&self, arena: &PointArena, i: usize) -> bool {
        let v = arena[self.shape.get(i)];
        let a = arena[self.shape.get(self.shape.prev_index(i))] - v;
        let b = arena[self.shape.get(self.shape.next_index(i))] - v;
        let len = a.length() * b.length();
        if len == 0.0 {
            return false;
        }
        let angle = (a.dot(b) / len).clamp(-1.0, 1.0).acos();
        self.shape.is_convex_vertex(arena, i) && angle < MIN_GATE_ANGLE
    }

    /// Split the only outside patch touching `gate` towards its far side
    fn split_outer_patch(
        &self,
        arena: &PointArena,
        patches: &mut Vec<Patch>,
        reserved: &[PointId],
        gate: PointId,
    ) {
        let outer: Vec<usize> = patches_by_vertex(patches, gate)
            .into_iter()
            .filter(|p| !self.patches.contains(p))
            .collect();
        let [outer] = outer[..] else {
            return;
        };
        if patches[outer].shape.len() <= 3 {
            return;
        }

        let (Some(next), Some(prev)) = (self.shape.next(gate), self.shape.prev(gate)) else {
            return;
        };
        let along = arena[next] - arena[prev];
        let out = DVec2::new(along.y, -along.x);
        let origin = arena[gate];

        let mut farthest = None;
        let mut best = f64::NEG_INFINITY;
        for v in patches[outer].shape.iter() {
            if self.shape.contains(v) || reserved.contains(&v) {
                continue;
            }
            let dir = arena[v] - origin;
            let score = dir.dot(out) / dir.length();
            if score > best {
                best = score;
                farthest = Some(v);
            }
        }
        let Some(farthest) = farthest else {
            return;
        };

        let Some((a, b)) = patches[outer].shape.split(gate, farthest) else {
            return;
        };
        if a.len() >= 3 && b.len() >= 3 {
            let source = patches[outer].clone();
            patches[outer] = Patch::with_flags_of(a, &source);
            patches.push(Patch::with_flags_of(b, &source));
        }
    }

    /// Place towers on every non-gate vertex next to masonry
    pub(crate) fn build_towers(&mut self, arena: &PointArena) {
        self.towers.clear();
        if !self.real {
            return;
        }
        let n = self.shape.len();
        for i in 0..n {
            let v = self.shape.get(i);
            if !self.gates.contains(&v) && (self.segments[(i + n - 1) % n] || self.segments[i]) {
                self.towers.push(arena[v]);
            }
        }
    }

    /// A real wall is drawn; an unreal one only bounds the city
    #[inline]
    pub fn is_real(&self) -> bool {
        self.real
    }

    /// Indices of the enclosed patches
    #[inline]
    pub fn patches(&self) -> &[usize] {
        &self.patches
    }

    /// Farthest wall vertex from the origin
    pub fn radius(&self, arena: &PointArena) -> f64 {
        radius_of(arena, &self.shape)
    }

    /// Whether the patch edge `v0 -> v1` runs along masonry
    ///
    /// Enclosed patches share the wall's winding, outside patches run the
    /// edge the other way.
    pub fn borders_by(&self, patch: usize, v0: PointId, v1: PointId) -> bool {
        let index = if self.patches.contains(&patch) {
            self.shape.find_edge(v0, v1)
        } else {
            self.shape.find_edge(v1, v0)
        };
        index.is_some_and(|i| self.segments[i])
    }

    /// Whether any masonry segment runs along the patch
    pub fn borders(&self, patch: usize, shape: &Polygon) -> bool {
        let within = self.patches.contains(&patch);
        self.shape
            .edges()
            .enumerate()
            .filter(|&(i, _)| self.segments[i])
            .any(|(_, (v0, v1))| {
                if within {
                    shape.find_edge(v0, v1).is_some()
                } else {
                    shape.find_edge(v1, v0).is_some()
                }
            })
    }

    /// Count a patch added after construction as enclosed
    pub(crate) fn enclose(&mut self, patch: usize) {
        if !self.patches.contains(&patch) {
            self.patches.push(patch);
        }
    }

    /// Renumber enclosed patches after the patch list was filtered
    pub(crate) fn remap(&mut self, map: &[Option<usize>]) {
        self.patches = self
            .patches
            .iter()
            .filter_map(|&p| map.get(p).copied().flatten())
            .collect();
    }
}
