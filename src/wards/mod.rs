//! Ward kinds and their building layouts
//!
//! A ward is a tag plus the building footprints generated for its patch. The
//! common residential kinds share one subdivision routine with different
//! [`AlleyParams`]; the special kinds (market, temple, castle, park, farm)
//! each lay out their patch their own way.

mod alleys;
mod geometry;
mod rating;

pub use alleys::{create_alleys, create_ortho_building};
pub(crate) use geometry::build_geometry;
pub(crate) use rating::rate_location;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::building::{CurtainWall, Patch};
use crate::geom::{PointArena, PointId, Polygon};
use crate::random::RandomSource;

/// Kind of ward assigned to a patch
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WardKind {
    Craftsmen,
    Merchant,
    Slum,
    Patriciate,
    Administration,
    Military,
    Market,
    Cathedral,
    Park,
    Gate,
    Castle,
    Farm,
    /// Open land outside the town
    Countryside,
}

impl WardKind {
    /// Map label, `None` for plain countryside
    pub fn label(self) -> Option<&'static str> {
        match self {
            WardKind::Craftsmen => Some("Craftsmen"),
            WardKind::Merchant => Some("Merchant"),
            WardKind::Slum => Some("Slum"),
            WardKind::Patriciate => Some("Patriciate"),
            WardKind::Administration => Some("Administration"),
            WardKind::Military => Some("Military"),
            WardKind::Market => Some("Market"),
            WardKind::Cathedral => Some("Temple"),
            WardKind::Park => Some("Park"),
            WardKind::Gate => Some("Gate"),
            WardKind::Castle => Some("Castle"),
            WardKind::Farm => Some("Farm"),
            WardKind::Countryside => None,
        }
    }

    /// Whether placement ranks patches for this kind
    pub fn is_rated(self) -> bool {
        matches!(
            self,
            WardKind::Merchant
                | WardKind::Slum
                | WardKind::Patriciate
                | WardKind::Administration
                | WardKind::Military
                | WardKind::Market
                | WardKind::Cathedral
        )
    }

    /// Subdivision parameters of the common kinds, drawn per ward
    ///
    /// Building size and grid chaos are randomised within ranges that
    /// characterise each kind: slums are small and chaotic, patrician
    /// estates large and regular.
    pub fn alley_params<R: RandomSource>(self, rng: &mut R) -> Option<AlleyParams> {
        let (area, area_spread, chaos, chaos_spread, size_chaos, empty) = match self {
            WardKind::Craftsmen => (10.0, 80.0, 0.5, 0.2, 0.6, 0.04),
            WardKind::Merchant => (50.0, 60.0, 0.5, 0.3, 0.7, 0.15),
            WardKind::Slum => (10.0, 30.0, 0.6, 0.4, 0.8, 0.03),
            WardKind::Patriciate => (80.0, 30.0, 0.5, 0.3, 0.8, 0.2),
            WardKind::Administration => (80.0, 30.0, 0.1, 0.3, 0.3, 0.04),
            WardKind::Gate => (10.0, 50.0, 0.5, 0.3, 0.7, 0.04),
            _ => return None,
        };
        let min_area = area + area_spread * rng.float() * rng.float();
        let grid_chaos = chaos + chaos_spread * rng.float();
        Some(AlleyParams::new(min_area, grid_chaos, size_chaos, empty))
    }
}

/// Parameters of the recursive alley subdivision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlleyParams {
    /// Blocks smaller than this become buildings
    pub min_area: f64,
    /// 0 cuts on a regular grid, 1 varies position and angle of every cut
    pub grid_chaos: f64,
    /// Spread of the building size around `min_area`
    pub size_chaos: f64,
    /// Chance that a finished block is left empty
    pub empty_probability: f64,
}

impl AlleyParams {
    pub fn new(min_area: f64, grid_chaos: f64, size_chaos: f64, empty_probability: f64) -> Self {
        Self {
            min_area,
            grid_chaos,
            size_chaos,
            empty_probability,
        }
    }
}

/// Ward assigned to a patch together with its buildings
#[derive(Debug, Clone, PartialEq)]
pub struct Ward {
    pub kind: WardKind,
    /// Building footprints, empty until the layout stage ran
    pub geometry: Vec<Polygon>,
}

impl Ward {
    pub fn new(kind: WardKind) -> Self {
        Self {
            kind,
            geometry: Vec::new(),
        }
    }
}

/// Placement sequence for the unassigned city patches
///
/// With `k` patches to fill only the first `k` entries are placed, so the
/// head of the list is what small towns get.
pub const WARDS: [WardKind; 36] = [
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Merchant,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Cathedral,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Administration,
    WardKind::Craftsmen,
    WardKind::Slum,
    WardKind::Craftsmen,
    WardKind::Slum,
    WardKind::Patriciate,
    WardKind::Market,
    WardKind::Slum,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Slum,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Craftsmen,
    WardKind::Military,
    WardKind::Slum,
    WardKind::Craftsmen,
    WardKind::Park,
    WardKind::Patriciate,
    WardKind::Market,
    WardKind::Merchant,
];

/// The placement sequence with `len / 10` random neighbour swaps
pub fn shuffled_wards<R: RandomSource>(rng: &mut R) -> Vec<WardKind> {
    let mut wards = WARDS.to_vec();
    for _ in 0..wards.len() / 10 {
        let i = rng.int(0, wards.len() - 1);
        wards.swap(i, i + 1);
    }
    wards
}

/// Read-only view of the town used to rate and lay out wards
pub(crate) struct WardContext<'a> {
    pub patches: &'a [Patch],
    pub inner: &'a [usize],
    pub plaza: Option<usize>,
    pub citadel: Option<usize>,
    pub center: PointId,
    pub wall: Option<&'a CurtainWall>,
    pub gates: &'a [PointId],
    pub arteries: &'a [Vec<PointId>],
}

impl WardContext<'_> {
    /// Reference point for distance ratings: plaza centre or town centre
    pub fn focus(&self, arena: &PointArena) -> glam::DVec2 {
        match self.plaza {
            Some(p) => self.patches[p].shape.center(arena),
            None => arena[self.center],
        }
    }

    /// Whether the edge `v0 -> v1` runs along an artery
    pub fn on_artery(&self, v0: PointId, v1: PointId) -> bool {
        self.arteries.iter().any(|a| a.contains(&v0) && a.contains(&v1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::tests::Scripted;

    #[test]
    fn test_sequence_counts() {
        let count = |k: WardKind| WARDS.iter().filter(|&&w| w == k).count();
        assert_eq!(count(WardKind::Craftsmen), 21);
        assert_eq!(count(WardKind::Slum), 5);
        assert_eq!(count(WardKind::Market), 2);
        assert_eq!(count(WardKind::Patriciate), 2);
        assert_eq!(count(WardKind::Merchant), 2);
        assert_eq!(count(WardKind::Cathedral), 1);
    }

    #[test]
    fn test_shuffle_swaps_neighbours() {
        // three swaps, always at index 0
        let mut rng = Scripted::new(&[0.0]);
        let wards = shuffled_wards(&mut rng);
        assert_eq!(wards.len(), WARDS.len());
        // swapping twice restores, the third swap sticks
        assert_eq!(wards[0], WARDS[1]);
        assert_eq!(wards[1], WARDS[0]);
        assert_eq!(wards[2..], WARDS[2..]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(WardKind::Cathedral.label(), Some("Temple"));
        assert_eq!(WardKind::Countryside.label(), None);
        assert!(WardKind::Market.is_rated());
        assert!(!WardKind::Craftsmen.is_rated());
    }

    #[test]
    fn test_alley_params_only_for_common_kinds() {
        let mut rng = Scripted::new(&[0.5]);
        let p = WardKind::Craftsmen.alley_params(&mut rng).unwrap();
        assert!((p.min_area - 30.0).abs() < 1e-9);
        assert!((p.grid_chaos - 0.6).abs() < 1e-9);
        assert!(WardKind::Park.alley_params(&mut rng).is_none());
    }
}
