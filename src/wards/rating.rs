//! How well a patch suits a ward kind
//!
//! Lower is better; `f64::INFINITY` rules the patch out.

use super::{WardContext, WardKind};
use crate::geom::PointArena;

/// Rating of `patch` for `kind`, `None` for kinds placed at random
pub(crate) fn rate_location(
    kind: WardKind,
    ctx: &WardContext<'_>,
    arena: &PointArena,
    patch: usize,
) -> Option<f64> {
    let shape = &ctx.patches[patch].shape;
    let rating = match kind {
        WardKind::Market => {
            // never next to another market
            let crowded = ctx.inner.iter().any(|&p| {
                let other = &ctx.patches[p];
                other.ward.as_ref().is_some_and(|w| w.kind == WardKind::Market)
                    && other.shape.borders(shape)
            });
            if crowded {
                f64::INFINITY
            } else {
                match ctx.plaza {
                    Some(plaza) => shape.area(arena) / ctx.patches[plaza].shape.area(arena),
                    None => shape.distance(arena, arena[ctx.center]),
                }
            }
        }
        WardKind::Cathedral => match ctx.plaza {
            Some(plaza) if shape.borders(&ctx.patches[plaza].shape) => -1.0 / shape.area(arena),
            _ => shape.distance(arena, ctx.focus(arena)) * shape.area(arena),
        },
        WardKind::Administration => match ctx.plaza {
            Some(plaza) if shape.borders(&ctx.patches[plaza].shape) => 0.0,
            _ => shape.distance(arena, ctx.focus(arena)),
        },
        WardKind::Merchant => shape.distance(arena, ctx.focus(arena)),
        // slums keep away from the centre
        WardKind::Slum => -shape.distance(arena, ctx.focus(arena)),
        WardKind::Patriciate => {
            let mut rate = 0.0;
            let neighbours = ctx
                .patches
                .iter()
                .enumerate()
                .filter(|&(i, p)| i != patch && p.shape.borders(shape));
            for (_, other) in neighbours {
                match other.ward.as_ref().map(|w| w.kind) {
                    Some(WardKind::Park) => rate -= 1.0,
                    Some(WardKind::Slum) => rate += 1.0,
                    _ => {}
                }
            }
            rate
        }
        WardKind::Military => {
            let by_citadel = ctx
                .citadel
                .is_some_and(|c| ctx.patches[c].shape.borders(shape));
            if by_citadel {
                0.0
            } else if ctx.wall.is_some_and(|w| w.borders(patch, shape)) {
                1.0
            } else if ctx.citadel.is_none() && ctx.wall.is_none() {
                0.0
            } else {
                f64::INFINITY
            }
        }
        _ => return None,
    };
    Some(rating)
}
