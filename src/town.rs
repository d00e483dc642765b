//! Town: the assembled map and the pipeline that builds it

use glam::DVec2;

use crate::building::{patches_by_vertex, CurtainWall, Patch, Topology};
use crate::config::{min_patch_count, validate, TownConfig};
use crate::error::{Result, TownError};
use crate::generation::partition_plane;
use crate::geom::{PointArena, PointId, Polygon};
use crate::random::{RandomSource, SeededRandom};
use crate::util::Timed;
use crate::wards::{build_geometry, rate_location, shuffled_wards, Ward, WardContext, WardKind};

/// Edges shorter than this are collapsed into one junction
const MIN_EDGE: f64 = 8.0;

/// A generated town
///
/// Every polygon refers to points in one shared arena; use [`Town::points`]
/// (or [`Town::position`]) to turn ids into coordinates.
///
/// # Example
///
/// ```no_run
/// use rust_voronoi_town::*;
///
/// let config = TownConfigBuilder::new()
///     .seed(42)
///     .size(TownSize::SmallCity)
///     .walls(true)
///     .build()
///     .unwrap();
///
/// let town = Town::generate(config).unwrap();
/// for patch in town.patches() {
///     if let Some(label) = patch.label() {
///         println!("{}: {} buildings", label, patch.ward.as_ref().map_or(0, |w| w.geometry.len()));
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Town {
    /// Configuration with every flag resolved
    config: TownConfig,
    arena: PointArena,
    patches: Vec<Patch>,
    inner: Vec<usize>,
    center: PointId,
    plaza: Option<usize>,
    citadel: Option<usize>,
    border: CurtainWall,
    citadel_wall: Option<CurtainWall>,
    gates: Vec<PointId>,
    streets: Vec<Vec<PointId>>,
    roads: Vec<Vec<PointId>>,
    arteries: Vec<Vec<PointId>>,
    city_radius: f64,
}

impl Town {
    /// Generate a town from a configuration
    ///
    /// Draws everything from a [`SeededRandom`] seeded with `config.seed`, so
    /// equal configs give equal towns.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for an unsupported configuration
    /// - `DegenerateTriangle` / `BrokenBoundary` when the plane partition fails
    /// - `GenerationFailed` when every attempt produced a rejected layout
    pub fn generate(config: TownConfig) -> Result<Self> {
        let mut rng = SeededRandom::new(config.seed);
        Self::generate_with_rng(config, &mut rng)
    }

    /// Generate a town drawing from a caller-provided random source
    ///
    /// `config.seed` is ignored; the layout depends only on the other config
    /// fields and the stream of `rng`.
    pub fn generate_with_rng<R: RandomSource>(config: TownConfig, rng: &mut R) -> Result<Self> {
        validate(&config)?;
        let _t = Timed::info("Town generation");

        let flags = Flags::resolve(&config, rng);
        log::debug!(
            "{} patches, plaza: {}, citadel: {}, walls: {}",
            config.patch_count,
            flags.plaza,
            flags.citadel,
            flags.walls
        );
        let config = TownConfig {
            plaza: Some(flags.plaza),
            citadel: Some(flags.citadel),
            walls: Some(flags.walls),
            ..config
        };

        let mut reason = String::new();
        for attempt in 1..=config.max_attempts {
            match Layout::build(config.patch_count, flags, rng) {
                Ok((layout, border)) => {
                    let town = layout.into_town(config, border);
                    log::info!(
                        "town ready after {} attempt(s): {} patches, {} gates, {} arteries",
                        attempt,
                        town.patches.len(),
                        town.gates.len(),
                        town.arteries.len()
                    );
                    return Ok(town);
                }
                Err(err) if err.is_retryable() => {
                    log::warn!("attempt {} rejected: {}", attempt, err);
                    reason = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }
        Err(TownError::GenerationFailed {
            attempts: config.max_attempts,
            reason,
        })
    }

    /// Configuration used, with `plaza`, `citadel` and `walls` resolved
    pub fn config(&self) -> &TownConfig {
        &self.config
    }

    pub fn has_plaza(&self) -> bool {
        self.plaza.is_some()
    }

    pub fn has_citadel(&self) -> bool {
        self.citadel.is_some()
    }

    pub fn has_walls(&self) -> bool {
        self.border.is_real()
    }

    /// Point storage behind every shape of the town
    pub fn points(&self) -> &PointArena {
        &self.arena
    }

    #[inline]
    pub fn position(&self, id: PointId) -> DVec2 {
        self.arena[id]
    }

    /// Positions of a street, road or artery
    pub fn polyline(&self, ids: &[PointId]) -> Vec<DVec2> {
        self.arena.positions(ids)
    }

    /// All patches, city and countryside
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patch(&self, index: usize) -> Option<&Patch> {
        self.patches.get(index)
    }

    /// Indices of the city patches (the citadel excluded)
    pub fn inner(&self) -> &[usize] {
        &self.inner
    }

    /// Junction the town is laid out around
    pub fn center(&self) -> PointId {
        self.center
    }

    pub fn plaza(&self) -> Option<&Patch> {
        self.plaza.map(|i| &self.patches[i])
    }

    pub fn citadel(&self) -> Option<&Patch> {
        self.citadel.map(|i| &self.patches[i])
    }

    /// City boundary; only a real wall when the town has walls
    pub fn border(&self) -> &CurtainWall {
        &self.border
    }

    /// City wall, if built
    pub fn wall(&self) -> Option<&CurtainWall> {
        self.border.is_real().then_some(&self.border)
    }

    pub fn citadel_wall(&self) -> Option<&CurtainWall> {
        self.citadel_wall.as_ref()
    }

    /// Every real wall: the city wall, then the castle wall
    pub fn walls(&self) -> impl Iterator<Item = &CurtainWall> + '_ {
        self.wall().into_iter().chain(self.citadel_wall.as_ref())
    }

    /// Gates of the city wall followed by the castle gates
    pub fn gates(&self) -> &[PointId] {
        &self.gates
    }

    /// Gate-to-centre paths, listed from the centre end
    pub fn streets(&self) -> &[Vec<PointId>] {
        &self.streets
    }

    /// Paths from the countryside to the city gates, listed from the gate
    pub fn roads(&self) -> &[Vec<PointId>] {
        &self.roads
    }

    /// Streets and roads merged into unique polylines
    pub fn arteries(&self) -> &[Vec<PointId>] {
        &self.arteries
    }

    /// Distance from the origin to the farthest city vertex
    pub fn city_radius(&self) -> f64 {
        self.city_radius
    }

    /// Number of patches holding a `kind` ward
    pub fn ward_count(&self, kind: WardKind) -> usize {
        self.patches
            .iter()
            .filter(|p| p.ward.as_ref().is_some_and(|w| w.kind == kind))
            .count()
    }

    /// Index of the patch containing `position`
    pub fn find_patch_at(&self, position: DVec2) -> Option<usize> {
        self.patches
            .iter()
            .position(|p| p.shape.contains_point(&self.arena, position))
    }
}

/// Feature flags after the random ones were drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flags {
    plaza: bool,
    citadel: bool,
    walls: bool,
}

impl Flags {
    /// Draw unset flags in plaza, citadel, walls order
    ///
    /// A drawn flag the patch count cannot support is switched off.
    fn resolve<R: RandomSource>(config: &TownConfig, rng: &mut R) -> Self {
        let mut flags = Flags {
            plaza: config.plaza.unwrap_or(false),
            citadel: config.citadel.unwrap_or(false),
            walls: config.walls.unwrap_or(false),
        };
        let fits = |f: &Flags| min_patch_count(f.plaza, f.citadel, f.walls) <= config.patch_count;

        if config.plaza.is_none() {
            flags.plaza = rng.bool(0.5);
            if !fits(&flags) {
                flags.plaza = false;
            }
        }
        if config.citadel.is_none() {
            flags.citadel = rng.bool(0.5);
            if !fits(&flags) {
                flags.citadel = false;
            }
        }
        if config.walls.is_none() {
            flags.walls = rng.bool(0.5);
            if !fits(&flags) {
                flags.walls = false;
            }
        }
        flags
    }
}

/// Town under construction during one attempt
struct Layout {
    flags: Flags,
    patch_count: usize,
    arena: PointArena,
    patches: Vec<Patch>,
    inner: Vec<usize>,
    center: PointId,
    plaza: Option<usize>,
    citadel: Option<usize>,
    citadel_wall: Option<CurtainWall>,
    gates: Vec<PointId>,
    streets: Vec<Vec<PointId>>,
    roads: Vec<Vec<PointId>>,
    arteries: Vec<Vec<PointId>>,
    city_radius: f64,
}

impl Layout {
    /// Run every stage once
    fn build<R: RandomSource>(
        patch_count: usize,
        flags: Flags,
        rng: &mut R,
    ) -> Result<(Self, CurtainWall)> {
        let mut layout = {
            let _t = Timed::debug("Patches");
            Self::build_patches(patch_count, flags, rng)?
        };
        {
            let _t = Timed::debug("Junctions");
            let mut targets = layout.inner.clone();
            targets.extend(layout.citadel);
            optimize_junctions(&mut layout.arena, &mut layout.patches, &targets)?;
        }
        let border = {
            let _t = Timed::debug("Walls");
            layout.build_walls(rng)?
        };
        {
            let _t = Timed::debug("Streets");
            layout.build_streets(&border)?;
        }
        {
            let _t = Timed::debug("Wards");
            layout.create_wards(&border, rng);
        }
        {
            let _t = Timed::debug("Geometry");
            layout.build_geometry(&border, rng);
        }
        Ok((layout, border))
    }

    fn build_patches<R: RandomSource>(patch_count: usize, flags: Flags, rng: &mut R) -> Result<Self> {
        let (arena, outlines) = partition_plane(patch_count, rng)?;
        if outlines.len() <= patch_count {
            return Err(TownError::rejected("too few cells"));
        }

        let mut center = None;
        let mut patches = Vec::with_capacity(outlines.len());
        let mut inner = Vec::with_capacity(patch_count);
        let (mut plaza, mut citadel) = (None, None);

        for (i, shape) in outlines.into_iter().enumerate() {
            let mut patch = Patch::new(shape);
            if i == 0 {
                center = patch.shape.min_by(&arena, |p| p.length());
                if flags.plaza {
                    plaza = Some(i);
                }
            } else if i == patch_count && flags.citadel {
                patch.within_city = true;
                citadel = Some(i);
            }
            if i < patch_count {
                patch.within_city = true;
                patch.within_walls = flags.walls;
                inner.push(i);
            }
            patches.push(patch);
        }
        let center = center.ok_or_else(|| TownError::rejected("empty central cell"))?;
        log::debug!("{} cells, {} in the city", patches.len(), inner.len());

        Ok(Self {
            flags,
            patch_count,
            arena,
            patches,
            inner,
            center,
            plaza,
            citadel,
            citadel_wall: None,
            gates: Vec::new(),
            streets: Vec::new(),
            roads: Vec::new(),
            arteries: Vec::new(),
            city_radius: 0.0,
        })
    }

    /// City boundary (a real wall or not), far patches dropped, citadel walled
    fn build_walls<R: RandomSource>(&mut self, rng: &mut R) -> Result<CurtainWall> {
        let reserved: Vec<PointId> = self
            .citadel
            .map(|c| self.patches[c].shape.vertices().to_vec())
            .unwrap_or_default();
        let mut border = CurtainWall::new(
            self.flags.walls,
            &mut self.arena,
            &mut self.patches,
            &self.inner,
            &reserved,
            rng,
        )?;
        if self.flags.walls {
            border.build_towers(&self.arena);
        }

        let reach = border.radius(&self.arena) * 3.0;
        let origin = self.arena[self.center];
        let mut map = Vec::with_capacity(self.patches.len());
        let mut kept = Vec::with_capacity(self.patches.len());
        for patch in std::mem::take(&mut self.patches) {
            if patch.shape.distance(&self.arena, origin) < reach {
                map.push(Some(kept.len()));
                kept.push(patch);
            } else {
                map.push(None);
            }
        }
        log::debug!("dropped {} far patches", map.len() - kept.len());
        self.patches = kept;
        self.inner = self.inner.iter().filter_map(|&i| map[i]).collect();
        self.plaza = self.plaza.and_then(|i| map[i]);
        self.citadel = self.citadel.and_then(|i| map[i]);
        border.remap(&map);

        self.gates = border.gates.clone();

        if let Some(citadel) = self.citadel {
            self.patches[citadel].ward = Some(Ward::new(WardKind::Castle));
            let reserved: Vec<PointId> = self.patches[citadel]
                .shape
                .iter()
                .filter(|&v| {
                    patches_by_vertex(&self.patches, v)
                        .iter()
                        .any(|&p| !self.patches[p].within_city)
                })
                .collect();

            let before = self.patches.len();
            let mut wall = CurtainWall::new(
                true,
                &mut self.arena,
                &mut self.patches,
                &[citadel],
                &reserved,
                rng,
            )?;
            wall.build_towers(&self.arena);
            // a gate split may have cut a city patch in two
            for i in before..self.patches.len() {
                if self.patches[i].within_city {
                    border.enclose(i);
                }
            }

            if self.patches[citadel].shape.compactness(&self.arena) < 0.75 {
                return Err(TownError::rejected("bad citadel shape"));
            }
            self.gates.extend_from_slice(&wall.gates);
            self.citadel_wall = Some(wall);
        }

        self.inner = (0..self.patches.len())
            .filter(|&i| self.patches[i].within_city && Some(i) != self.citadel)
            .collect();
        Ok(border)
    }

    /// Streets from every gate to the centre, roads from the countryside
    fn build_streets(&mut self, border: &CurtainWall) -> Result<()> {
        let mut blocked: Vec<PointId> = Vec::new();
        if let Some(c) = self.citadel {
            blocked.extend(self.patches[c].shape.iter());
        }
        if self.flags.walls {
            blocked.extend(border.shape.iter());
        }
        blocked.retain(|v| !self.gates.contains(v));

        let topology = Topology::new(&self.arena, &self.patches, &border.shape, &blocked);

        let mut streets = Vec::with_capacity(self.gates.len());
        let mut roads = Vec::new();
        for &gate in &self.gates {
            let end = match self.plaza {
                Some(p) => self.patches[p]
                    .shape
                    .min_by(&self.arena, |v| v.distance(self.arena[gate]))
                    .unwrap_or(self.center),
                None => self.center,
            };
            let street = topology.build_path(gate, end, topology.outer());
            if street.is_empty() {
                return Err(TownError::rejected("unable to build a street"));
            }
            streets.push(street);

            if border.gates.contains(&gate) {
                let heading = self.arena[gate].normalize_or_zero() * 1000.0;
                let road = topology
                    .nearest_point(&self.arena, heading)
                    .map(|start| topology.build_path(start, gate, topology.inner()))
                    .unwrap_or_default();
                if !road.is_empty() {
                    roads.push(road);
                }
            }
        }

        let plaza = self.plaza.map(|p| &self.patches[p].shape);
        let arteries = tidy_up_roads(plaza, &streets, &roads);
        for artery in &arteries {
            let smoothed = Polygon::new(artery.clone()).smooth_vertex_eq(&self.arena, 3.0);
            for i in 1..artery.len().saturating_sub(1) {
                self.arena.set(artery[i], smoothed[i]);
            }
        }
        log::debug!(
            "{} streets, {} roads, {} arteries",
            streets.len(),
            roads.len(),
            arteries.len()
        );

        self.streets = streets;
        self.roads = roads;
        self.arteries = arteries;
        Ok(())
    }

    fn context<'a>(&'a self, border: &'a CurtainWall) -> WardContext<'a> {
        WardContext {
            patches: &self.patches,
            inner: &self.inner,
            plaza: self.plaza,
            citadel: self.citadel,
            center: self.center,
            wall: self.flags.walls.then_some(border),
            gates: &self.gates,
            arteries: &self.arteries,
        }
    }

    fn create_wards<R: RandomSource>(&mut self, border: &CurtainWall, rng: &mut R) {
        if let Some(p) = self.plaza {
            self.patches[p].ward = Some(Ward::new(WardKind::Market));
        }

        let gate_chance = if self.flags.walls { 0.5 } else { 0.2 };
        for &gate in &border.gates {
            for p in patches_by_vertex(&self.patches, gate) {
                let patch = &mut self.patches[p];
                if patch.within_city && patch.ward.is_none() && rng.bool(gate_chance) {
                    patch.ward = Some(Ward::new(WardKind::Gate));
                }
            }
        }

        self.assign_wards(border, rng);

        if self.flags.walls && self.patch_count > 5 {
            let chance = 1.0 / (self.patch_count - 5) as f64;
            for &gate in &border.gates {
                if rng.bool(chance) {
                    continue;
                }
                for p in patches_by_vertex(&self.patches, gate) {
                    let patch = &mut self.patches[p];
                    if patch.ward.is_none() {
                        patch.within_city = true;
                        patch.ward = Some(Ward::new(WardKind::Gate));
                    }
                }
            }
        }

        self.city_radius = self
            .patches
            .iter()
            .filter(|p| p.within_city)
            .flat_map(|p| p.shape.iter())
            .map(|v| self.arena[v].length())
            .fold(0.0, f64::max);

        for patch in self.patches.iter_mut().filter(|p| p.ward.is_none()) {
            let kind = if rng.bool(0.2) && patch.shape.compactness(&self.arena) >= 0.7 {
                WardKind::Farm
            } else {
                WardKind::Countryside
            };
            patch.ward = Some(Ward::new(kind));
        }
    }

    /// Fill the unassigned city patches from the placement sequence
    fn assign_wards<R: RandomSource>(&mut self, border: &CurtainWall, rng: &mut R) {
        let mut unassigned: Vec<usize> = self
            .inner
            .iter()
            .copied()
            .filter(|&p| self.patches[p].ward.is_none())
            .collect();
        let mut sequence = shuffled_wards(rng);
        sequence.truncate(unassigned.len());
        let (mut rated, unrated): (Vec<WardKind>, Vec<WardKind>) =
            sequence.into_iter().partition(|k| k.is_rated());

        while !rated.is_empty() && !unassigned.is_empty() {
            let mut best: Option<(f64, WardKind, usize)> = None;
            let mut hopeless = Vec::new();
            {
                let ctx = self.context(border);
                let mut seen = Vec::new();
                for &kind in &rated {
                    if seen.contains(&kind) {
                        continue;
                    }
                    seen.push(kind);

                    let mut placeable = false;
                    for (slot, &patch) in unassigned.iter().enumerate() {
                        let Some(rating) = rate_location(kind, &ctx, &self.arena, patch) else {
                            continue;
                        };
                        if !rating.is_finite() {
                            continue;
                        }
                        placeable = true;
                        if best.map_or(true, |(r, _, _)| rating < r) {
                            best = Some((rating, kind, slot));
                        }
                    }
                    if !placeable {
                        hopeless.push(kind);
                    }
                }
            }
            if !hopeless.is_empty() {
                log::debug!("no place left for {:?}", hopeless);
                rated.retain(|k| !hopeless.contains(k));
            }

            let Some((_, kind, slot)) = best else {
                break;
            };
            if let Some(i) = rated.iter().position(|&k| k == kind) {
                rated.remove(i);
            }
            let patch = unassigned.remove(slot);
            self.patches[patch].ward = Some(Ward::new(kind));
        }

        for kind in unrated {
            if unassigned.is_empty() {
                break;
            }
            let patch = unassigned.remove(rng.int(0, unassigned.len()));
            self.patches[patch].ward = Some(Ward::new(kind));
        }

        for patch in unassigned {
            self.patches[patch].ward = Some(Ward::new(WardKind::Slum));
        }
    }

    fn build_geometry<R: RandomSource>(&mut self, border: &CurtainWall, rng: &mut R) {
        let mut arena = std::mem::take(&mut self.arena);
        let mut layouts = Vec::with_capacity(self.patches.len());
        {
            let ctx = self.context(border);
            for (i, patch) in self.patches.iter().enumerate() {
                if let Some(ward) = &patch.ward {
                    layouts.push((i, build_geometry(ward.kind, &ctx, &mut arena, i, rng)));
                }
            }
        }
        self.arena = arena;

        let mut buildings = 0;
        for (i, geometry) in layouts {
            if let Some(ward) = self.patches[i].ward.as_mut() {
                buildings += geometry.len();
                ward.geometry = geometry;
            }
        }
        log::debug!("{} buildings", buildings);
    }

    fn into_town(self, config: TownConfig, border: CurtainWall) -> Town {
        Town {
            config,
            arena: self.arena,
            patches: self.patches,
            inner: self.inner,
            center: self.center,
            plaza: self.plaza,
            citadel: self.citadel,
            border,
            citadel_wall: self.citadel_wall,
            gates: self.gates,
            streets: self.streets,
            roads: self.roads,
            arteries: self.arteries,
            city_radius: self.city_radius,
        }
    }
}

/// Collapse short edges of the `targets` patches
///
/// The first vertex of a short edge moves to the midpoint and absorbs the
/// second one in every patch. Fails when a patch is left with fewer than
/// three vertices.
fn optimize_junctions(arena: &mut PointArena, patches: &mut [Patch], targets: &[usize]) -> Result<()> {
    let mut touched = Vec::new();
    let mut merged = 0;
    for &w in targets {
        let mut index = 0;
        while index < patches[w].shape.len() {
            let shape = &patches[w].shape;
            let v0 = shape.get(index);
            let v1 = shape.get(shape.next_index(index));
            if v0 != v1 && arena[v0].distance(arena[v1]) < MIN_EDGE {
                for other in patches_by_vertex(patches, v1) {
                    if other != w {
                        patches[other].shape.replace(v1, v0);
                        touched.push(other);
                    }
                }
                arena.set(v0, (arena[v0] + arena[v1]) * 0.5);
                patches[w].shape.remove(v1);
                merged += 1;
            }
            index += 1;
        }
    }
    for w in touched {
        patches[w].shape.dedup();
    }
    log::debug!("merged {} short edges", merged);

    if patches.iter().any(|p| p.shape.len() < 3) {
        return Err(TownError::rejected("degenerate patch"));
    }
    Ok(())
}

/// Merge streets and roads into unique polylines
///
/// Paths are cut into directed segments (dropping duplicates and segments
/// along the plaza), then taken from the back and chained onto an artery
/// that starts where they end or ends where they start.
fn tidy_up_roads(
    plaza: Option<&Polygon>,
    streets: &[Vec<PointId>],
    roads: &[Vec<PointId>],
) -> Vec<Vec<PointId>> {
    let mut segments: Vec<(PointId, PointId)> = Vec::new();
    for path in streets.iter().chain(roads) {
        for pair in path.windows(2) {
            let (v0, v1) = (pair[0], pair[1]);
            if plaza.is_some_and(|s| s.contains(v0) && s.contains(v1)) {
                continue;
            }
            if !segments.contains(&(v0, v1)) {
                segments.push((v0, v1));
            }
        }
    }

    let mut arteries: Vec<Vec<PointId>> = Vec::new();
    while let Some((start, end)) = segments.pop() {
        let mut attached = false;
        for artery in arteries.iter_mut() {
            if artery.first() == Some(&end) {
                artery.insert(0, start);
                attached = true;
                break;
            }
            if artery.last() == Some(&start) {
                artery.push(end);
                attached = true;
                break;
            }
        }
        if !attached {
            arteries.push(vec![start, end]);
        }
    }
    arteries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::tests::Scripted;

    fn points(arena: &mut PointArena, coords: &[(f64, f64)]) -> Vec<PointId> {
        coords.iter().map(|&(x, y)| arena.add(DVec2::new(x, y))).collect()
    }

    #[test]
    fn test_flags_drawn_in_order() {
        let config = TownConfig {
            patch_count: 4,
            ..Default::default()
        };
        // every draw says yes; walls would need 6 patches
        let mut rng = Scripted::new(&[0.0]);
        let flags = Flags::resolve(&config, &mut rng);
        assert_eq!(
            flags,
            Flags {
                plaza: true,
                citadel: true,
                walls: false
            }
        );
    }

    #[test]
    fn test_explicit_flags_kept() {
        let config = TownConfig {
            patch_count: 15,
            walls: Some(true),
            ..Default::default()
        };
        let mut rng = Scripted::new(&[0.9]);
        let flags = Flags::resolve(&config, &mut rng);
        assert_eq!(
            flags,
            Flags {
                plaza: false,
                citadel: false,
                walls: true
            }
        );
    }

    #[test]
    fn test_short_edge_collapses() {
        let mut arena = PointArena::new();
        let v = points(
            &mut arena,
            &[(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0), (40.0, 0.0), (40.0, 20.0), (20.0, 4.0)],
        );
        let (a, b, c, d, e, f, g) = (v[0], v[1], v[2], v[3], v[4], v[5], v[6]);
        let mut patches = vec![
            Patch::new(Polygon::new(vec![a, b, g, c, d])),
            Patch::new(Polygon::new(vec![b, e, f, c, g])),
        ];

        optimize_junctions(&mut arena, &mut patches, &[0]).unwrap();
        assert_eq!(patches[0].shape.vertices(), &[a, b, c, d]);
        assert_eq!(patches[1].shape.vertices(), &[b, e, f, c]);
        assert_eq!(arena[b], DVec2::new(20.0, 2.0));
    }

    #[test]
    fn test_collapse_to_degenerate_patch_is_rejected() {
        let mut arena = PointArena::new();
        let v = points(&mut arena, &[(0.0, 0.0), (20.0, 0.0), (20.0, 4.0)]);
        let mut patches = vec![Patch::new(Polygon::new(v))];
        let err = optimize_junctions(&mut arena, &mut patches, &[0]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_tidy_up_chains_segments() {
        let mut arena = PointArena::new();
        let p = points(&mut arena, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        let streets = vec![vec![p[2], p[1], p[0]], vec![p[2], p[1]]];
        let roads = vec![vec![p[3], p[4]]];

        let arteries = tidy_up_roads(None, &streets, &roads);
        assert_eq!(arteries, vec![vec![p[3], p[4]], vec![p[2], p[1], p[0]]]);
    }

    #[test]
    fn test_tidy_up_skips_plaza_edges() {
        let mut arena = PointArena::new();
        let p = points(&mut arena, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (1.0, 1.0)]);
        let plaza = Polygon::new(vec![p[0], p[1], p[3]]);
        let streets = vec![vec![p[0], p[1], p[2]]];

        let arteries = tidy_up_roads(Some(&plaza), &streets, &[]);
        assert_eq!(arteries, vec![vec![p[1], p[2]]]);
    }

    #[test]
    fn test_resolved_config() {
        let config = TownConfig {
            patch_count: 8,
            seed: 5,
            ..Default::default()
        };
        let town = Town::generate(config).unwrap();
        let resolved = town.config();
        assert!(resolved.plaza.is_some());
        assert!(resolved.citadel.is_some());
        assert!(resolved.walls.is_some());
        assert_eq!(resolved.plaza, Some(town.has_plaza()));
        assert_eq!(resolved.citadel, Some(town.has_citadel()));
        assert_eq!(resolved.walls, Some(town.has_walls()));
    }

    #[test]
    fn test_find_patch_at() {
        let config = TownConfig {
            patch_count: 6,
            seed: 3,
            walls: Some(false),
            ..Default::default()
        };
        let town = Town::generate(config).unwrap();
        assert_eq!(town.find_patch_at(DVec2::splat(1.0e6)), None);

        let found = town.patches().iter().enumerate().find_map(|(i, p)| {
            let c = p.shape.centroid(town.points());
            p.shape.contains_point(town.points(), c).then_some((i, c))
        });
        if let Some((_, c)) = found {
            let j = town.find_patch_at(c).unwrap();
            assert!(town.patches()[j].shape.contains_point(town.points(), c));
        }
    }
}
