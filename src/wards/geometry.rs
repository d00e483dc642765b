//! Building layouts of every ward kind

use glam::DVec2;
use std::f64::consts::PI;

use super::alleys::{create_alleys, create_ortho_building};
use super::{WardContext, WardKind};
use crate::building::cutter::{radial, ring, semi_radial};
use crate::building::{is_enclosed, neighbour, patches_by_vertex, ALLEY, MAIN_STREET, REGULAR_STREET};
use crate::geom::utils::{distance_to_line, interpolate};
use crate::geom::{PointArena, Polygon};
use crate::random::RandomSource;

/// Lay out the buildings of `patch` as a `kind` ward
pub(crate) fn build_geometry<R: RandomSource>(
    kind: WardKind,
    ctx: &WardContext<'_>,
    arena: &mut PointArena,
    patch: usize,
    rng: &mut R,
) -> Vec<Polygon> {
    let mut buildings = layout(kind, ctx, arena, patch, rng);
    // street insets can swallow a small block whole
    buildings.retain(|b| b.len() >= 3);
    buildings
}

fn layout<R: RandomSource>(
    kind: WardKind,
    ctx: &WardContext<'_>,
    arena: &mut PointArena,
    patch: usize,
    rng: &mut R,
) -> Vec<Polygon> {
    if let Some(params) = kind.alley_params(rng) {
        let block = city_block(ctx, arena, patch);
        let buildings = create_alleys(arena, &block, &params, rng);
        return if is_enclosed(ctx.patches, patch) {
            buildings
        } else {
            filter_outskirts(ctx, arena, patch, buildings, rng)
        };
    }

    match kind {
        WardKind::Market => market(ctx, arena, patch, rng),
        WardKind::Cathedral => {
            let block = city_block(ctx, arena, patch);
            if rng.bool(0.4) {
                let thickness = 2.0 + rng.float() * 4.0;
                ring(arena, &block, thickness).slices
            } else {
                create_ortho_building(arena, &block, 50.0, 0.8, rng)
            }
        }
        WardKind::Castle => {
            let shape = &ctx.patches[patch].shape;
            let block = if shape.is_convex(arena) {
                shape.shrink_eq(arena, MAIN_STREET * 2.0)
            } else {
                shape.buffer_eq(arena, -MAIN_STREET * 2.0)
            };
            let min_area = block.area(arena).max(0.0).sqrt() * 4.0;
            create_ortho_building(arena, &block, min_area, 0.6, rng)
        }
        WardKind::Military => {
            let block = city_block(ctx, arena, patch);
            let area = block.area(arena).max(0.0);
            let params = super::AlleyParams::new(
                area.sqrt() * (1.0 + rng.float()),
                0.1 + rng.float() * 0.3,
                0.3,
                0.25,
            );
            create_alleys(arena, &block, &params, rng)
        }
        WardKind::Park => {
            let block = city_block(ctx, arena, patch);
            if block.compactness(arena) >= 0.7 {
                radial(arena, &block, None, ALLEY)
            } else {
                semi_radial(arena, &block, None, ALLEY)
            }
        }
        WardKind::Farm => farm(ctx, arena, patch, rng),
        _ => Vec::new(),
    }
}

/// Buildable area of a patch once the surrounding streets are carved out
///
/// Edges along the wall or a main street give up half a main street, inner
/// edges half a regular street, everything else half an alley.
pub(crate) fn city_block(ctx: &WardContext<'_>, arena: &mut PointArena, patch: usize) -> Polygon {
    let p = &ctx.patches[patch];
    let inner_patch = ctx.wall.is_none() || p.within_walls;
    let plaza = ctx.plaza.map(|i| &ctx.patches[i].shape);

    let insets: Vec<f64> = p
        .shape
        .edges()
        .map(|(v0, v1)| {
            if ctx.wall.is_some_and(|w| w.borders_by(patch, v0, v1)) {
                return MAIN_STREET / 2.0;
            }
            let on_street = (inner_patch && plaza.is_some_and(|s| s.find_edge(v1, v0).is_some()))
                || ctx.on_artery(v0, v1);
            let width = if on_street {
                MAIN_STREET
            } else if inner_patch {
                REGULAR_STREET
            } else {
                ALLEY
            };
            width / 2.0
        })
        .collect();

    if p.shape.is_convex(arena) {
        p.shape.shrink(arena, &insets)
    } else {
        let outward: Vec<f64> = insets.iter().map(|d| -d).collect();
        p.shape.buffer(arena, &outward)
    }
}

struct PopulatedEdge {
    origin: DVec2,
    dir: DVec2,
    depth: f64,
}

/// Thin out buildings far from streets and built-up neighbours
fn filter_outskirts<R: RandomSource>(
    ctx: &WardContext<'_>,
    arena: &PointArena,
    patch: usize,
    buildings: Vec<Polygon>,
    rng: &mut R,
) -> Vec<Polygon> {
    let shape = &ctx.patches[patch].shape;

    let mut populated: Vec<PopulatedEdge> = Vec::new();
    for (v1, v2) in shape.edges() {
        let factor = if ctx.on_artery(v1, v2) {
            1.0
        } else {
            match neighbour(ctx.patches, patch, v1) {
                Some(n) if ctx.patches[n].within_city => {
                    if is_enclosed(ctx.patches, n) {
                        1.0
                    } else {
                        0.4
                    }
                }
                _ => continue,
            }
        };
        let (origin, dir) = (arena[v1], arena[v2] - arena[v1]);
        // how deep the patch reaches behind this edge
        let depth = shape
            .iter()
            .filter(|&v| v != v1 && v != v2)
            .map(|v| distance_to_line(origin, dir, arena[v]) * factor)
            .fold(0.0, f64::max);
        if depth > 0.0 {
            populated.push(PopulatedEdge { origin, dir, depth });
        }
    }

    let density: Vec<f64> = shape
        .iter()
        .map(|v| {
            if ctx.gates.contains(&v) {
                1.0
            } else if patches_by_vertex(ctx.patches, v)
                .iter()
                .all(|&p| ctx.patches[p].within_city)
            {
                2.0 * rng.fuzzy(1.0)
            } else {
                0.0
            }
        })
        .collect();

    buildings
        .into_iter()
        .filter(|building| {
            let mut min_dist = 1.0f64;
            for edge in &populated {
                for v in building.iter() {
                    let d = distance_to_line(edge.origin, edge.dir, arena[v]) / edge.depth;
                    min_dist = min_dist.min(d);
                }
            }
            let weights = shape.interpolate(arena, building.center(arena));
            let p: f64 = weights.iter().zip(&density).map(|(w, d)| w * d).sum();
            rng.fuzzy(1.0) > min_dist / p
        })
        .collect()
}

fn market<R: RandomSource>(
    ctx: &WardContext<'_>,
    arena: &mut PointArena,
    patch: usize,
    rng: &mut R,
) -> Vec<Polygon> {
    let shape = &ctx.patches[patch].shape;
    let statue = rng.bool(0.6);
    let offset = statue || rng.bool(0.3);

    let longest = shape
        .edges()
        .max_by(|a, b| {
            let la = arena[a.0].distance(arena[a.1]);
            let lb = arena[b.0].distance(arena[b.1]);
            la.total_cmp(&lb)
        })
        .map(|(v0, v1)| (arena[v0], arena[v1]));

    let object = if statue {
        let object = Polygon::rect(arena, 1.0 + rng.float(), 1.0 + rng.float());
        if let Some((v0, v1)) = longest {
            let d = v1 - v0;
            object.rotate(arena, d.y.atan2(d.x));
        }
        object
    } else {
        Polygon::circle(arena, 1.0 + rng.float())
    };

    let centroid = shape.centroid(arena);
    let position = match longest {
        Some((v0, v1)) if offset => {
            let gravity = interpolate(v0, v1, 0.5);
            interpolate(centroid, gravity, 0.2 + rng.float() * 0.4)
        }
        _ => centroid,
    };
    object.offset(arena, position);
    vec![object]
}

fn farm<R: RandomSource>(
    ctx: &WardContext<'_>,
    arena: &mut PointArena,
    patch: usize,
    rng: &mut R,
) -> Vec<Polygon> {
    let shape = &ctx.patches[patch].shape;
    if shape.is_empty() {
        return Vec::new();
    }
    let housing = Polygon::rect(arena, 4.0, 4.0);
    let corner = arena[shape.get(rng.int(0, shape.len()))];
    let pos = interpolate(corner, shape.centroid(arena), 0.3 + rng.float() * 0.4);
    housing.rotate(arena, rng.float() * PI);
    housing.offset(arena, pos);
    create_ortho_building(arena, &housing, 8.0, 0.5, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{grid_patches, Patch};
    use crate::geom::PointId;
    use crate::random::SeededRandom;
    use crate::wards::Ward;

    fn big_grid(arena: &mut PointArena) -> Vec<Patch> {
        let mut patches = grid_patches(arena, 3);
        let mut scaled: Vec<PointId> = Vec::new();
        for p in &patches {
            for v in p.shape.iter() {
                if !scaled.contains(&v) {
                    arena.set(v, arena[v] * 20.0);
                    scaled.push(v);
                }
            }
        }
        for p in patches.iter_mut() {
            p.within_city = true;
        }
        patches
    }

    fn context<'a>(patches: &'a [Patch], inner: &'a [usize], center: PointId) -> WardContext<'a> {
        WardContext {
            patches,
            inner,
            plaza: None,
            citadel: None,
            center,
            wall: None,
            gates: &[],
            arteries: &[],
        }
    }

    #[test]
    fn test_city_block_insets_regular_streets() {
        let mut arena = PointArena::new();
        let patches = big_grid(&mut arena);
        let inner: Vec<usize> = (0..9).collect();
        let ctx = context(&patches, &inner, patches[4].shape.get(0));

        // no wall: every edge is an inner street of width 1
        let block = city_block(&ctx, &mut arena, 4);
        assert!((block.area(&arena) - 19.0 * 19.0).abs() < 1e-6);
    }

    #[test]
    fn test_city_block_main_street_on_artery() {
        let mut arena = PointArena::new();
        let patches = big_grid(&mut arena);
        let inner: Vec<usize> = (0..9).collect();
        let bottom = vec![patches[4].shape.get(0), patches[4].shape.get(1)];
        let arteries = vec![bottom];
        let mut ctx = context(&patches, &inner, patches[4].shape.get(0));
        ctx.arteries = &arteries;

        let block = city_block(&ctx, &mut arena, 4);
        assert!((block.area(&arena) - 19.0 * 18.5).abs() < 1e-6);
    }

    #[test]
    fn test_market_single_object_inside() {
        let mut arena = PointArena::new();
        let patches = big_grid(&mut arena);
        let inner: Vec<usize> = (0..9).collect();
        let ctx = context(&patches, &inner, patches[4].shape.get(0));
        let mut rng = SeededRandom::new(4);

        let geometry = build_geometry(WardKind::Market, &ctx, &mut arena, 4, &mut rng);
        assert_eq!(geometry.len(), 1);
        let c = geometry[0].center(&arena);
        assert!(patches[4].shape.contains_point(&arena, c));
    }

    #[test]
    fn test_common_ward_buildings_inside_patch() {
        let mut arena = PointArena::new();
        let patches = big_grid(&mut arena);
        let inner: Vec<usize> = (0..9).collect();
        let ctx = context(&patches, &inner, patches[4].shape.get(0));
        let mut rng = SeededRandom::new(12);

        let geometry = build_geometry(WardKind::Craftsmen, &ctx, &mut arena, 4, &mut rng);
        assert!(!geometry.is_empty());
        for b in &geometry {
            assert!(patches[4].shape.contains_point(&arena, b.center(&arena)));
        }
    }

    #[test]
    fn test_outskirts_thin_out() {
        let mut arena = PointArena::new();
        let mut patches = big_grid(&mut arena);
        // corner patch with countryside on two sides
        for i in [0, 1, 3] {
            patches[i].within_city = false;
        }
        patches[4].ward = Some(Ward::new(WardKind::Craftsmen));
        let inner: Vec<usize> = (0..9).collect();
        let ctx = context(&patches, &inner, patches[4].shape.get(0));
        assert!(!is_enclosed(&patches, 4));

        let block = city_block(&ctx, &mut arena, 4);
        let params = crate::wards::AlleyParams::new(20.0, 0.4, 0.5, 0.0);
        let mut rng = SeededRandom::new(2);
        let buildings = create_alleys(&mut arena, &block, &params, &mut rng);
        let count = buildings.len();
        let kept = filter_outskirts(&ctx, &arena, 4, buildings, &mut rng);
        assert!(kept.len() < count);
    }

    #[test]
    fn test_special_layouts() {
        let mut arena = PointArena::new();
        let patches = big_grid(&mut arena);
        let inner: Vec<usize> = (0..9).collect();
        let ctx = context(&patches, &inner, patches[4].shape.get(0));
        let mut rng = SeededRandom::new(6);

        for kind in [WardKind::Cathedral, WardKind::Castle, WardKind::Park, WardKind::Farm, WardKind::Military] {
            let geometry = build_geometry(kind, &ctx, &mut arena, 4, &mut rng);
            assert!(!geometry.is_empty(), "{kind:?} produced nothing");
        }
        assert!(build_geometry(WardKind::Countryside, &ctx, &mut arena, 4, &mut rng).is_empty());
    }
}
