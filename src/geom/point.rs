//! Shared point storage
//!
//! Patches, walls, streets and the routing graph all refer to the same
//! junctions. Each junction lives once in a [`PointArena`] and is addressed by
//! a [`PointId`], so moving it through the arena moves it for every polygon
//! that references it.

use glam::DVec2;
use std::ops::Index;

/// Handle to a point stored in a [`PointArena`]
///
/// Two ids are the same vertex only when they are equal; coinciding
/// coordinates do not make points identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(u32);

impl PointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owner of every mutable point of a town
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointArena {
    coords: Vec<DVec2>,
}

impl PointArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new point and return its handle
    #[inline]
    pub fn add(&mut self, p: DVec2) -> PointId {
        let id = PointId(self.coords.len() as u32);
        self.coords.push(p);
        id
    }

    #[inline]
    pub fn get(&self, id: PointId) -> DVec2 {
        self.coords[id.index()]
    }

    /// Move a point; every polygon sharing it sees the new position
    #[inline]
    pub fn set(&mut self, id: PointId, p: DVec2) {
        self.coords[id.index()] = p;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Positions of a list of handles
    pub fn positions(&self, ids: &[PointId]) -> Vec<DVec2> {
        ids.iter().map(|&id| self.get(id)).collect()
    }
}

impl Index<PointId> for PointArena {
    type Output = DVec2;

    #[inline]
    fn index(&self, id: PointId) -> &DVec2 {
        &self.coords[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_move() {
        let mut arena = PointArena::new();
        let a = arena.add(DVec2::new(1.0, 2.0));
        let b = arena.add(DVec2::new(1.0, 2.0));
        assert_ne!(a, b);
        assert_eq!(arena[a], arena[b]);

        arena.set(a, DVec2::new(5.0, 5.0));
        assert_eq!(arena.get(a), DVec2::new(5.0, 5.0));
        assert_eq!(arena.get(b), DVec2::new(1.0, 2.0));
        assert_eq!(arena.len(), 2);
    }
}
