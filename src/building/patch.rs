//! Town districts and the neighbourhood queries over them

use crate::geom::{PointArena, PointId, Polygon};
use crate::wards::Ward;

/// One district of the town
///
/// Neighbouring patches share boundary points, so adjacency is found through
/// shared edges rather than stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub shape: Polygon,
    pub ward: Option<Ward>,
    /// Enclosed by the city wall
    pub within_walls: bool,
    /// Part of the town proper rather than the countryside
    pub within_city: bool,
}

impl Patch {
    pub fn new(shape: Polygon) -> Self {
        Self {
            shape,
            ward: None,
            within_walls: false,
            within_city: false,
        }
    }

    /// Same flags, different outline
    pub(crate) fn with_flags_of(shape: Polygon, other: &Patch) -> Self {
        Self {
            shape,
            ward: None,
            within_walls: other.within_walls,
            within_city: other.within_city,
        }
    }

    /// Display label of the assigned ward, if it has one
    pub fn label(&self) -> Option<&'static str> {
        self.ward.as_ref().and_then(|w| w.kind.label())
    }
}

/// Indices of every patch using vertex `v`
pub(crate) fn patches_by_vertex(patches: &[Patch], v: PointId) -> Vec<usize> {
    patches
        .iter()
        .enumerate()
        .filter(|(_, p)| p.shape.contains(v))
        .map(|(i, _)| i)
        .collect()
}

/// The patch on the other side of the edge of `patch` that starts at `v`
pub(crate) fn neighbour(patches: &[Patch], patch: usize, v: PointId) -> Option<usize> {
    let next = patches[patch].shape.next(v)?;
    patches.iter().position(|p| p.shape.find_edge(next, v).is_some())
}

/// Every patch sharing an edge with `patch`
pub(crate) fn neighbours(patches: &[Patch], patch: usize) -> Vec<usize> {
    let shape = &patches[patch].shape;
    patches
        .iter()
        .enumerate()
        .filter(|&(i, p)| i != patch && p.shape.borders(shape))
        .map(|(i, _)| i)
        .collect()
}

/// Inside the city and not exposed to the countryside
pub(crate) fn is_enclosed(patches: &[Patch], patch: usize) -> bool {
    let p = &patches[patch];
    p.within_city
        && (p.within_walls || neighbours(patches, patch).iter().all(|&n| patches[n].within_city))
}

/// Outer rim of a set of patches
///
/// Collects the edges not shared (reversed) with another patch of the set and
/// chains them by shared vertex. Returns `None` when the rim does not close.
pub(crate) fn find_circumference(patches: &[Patch], set: &[usize]) -> Option<Polygon> {
    match set {
        [] => return Some(Polygon::default()),
        [single] => return Some(patches[*single].shape.clone()),
        _ => {}
    }

    let mut rim: Vec<(PointId, PointId)> = Vec::new();
    for &i in set {
        for (a, b) in patches[i].shape.edges() {
            let inner_edge = set.iter().any(|&j| patches[j].shape.find_edge(b, a).is_some());
            if !inner_edge {
                rim.push((a, b));
            }
        }
    }
    if rim.is_empty() {
        return None;
    }

    let mut result = Vec::with_capacity(rim.len());
    let mut index = 0;
    loop {
        result.push(rim[index].0);
        index = rim.iter().position(|&(a, _)| a == rim[index].1)?;
        if index == 0 {
            break;
        }
        if result.len() > rim.len() {
            return None;
        }
    }
    Some(Polygon::new(result))
}

/// Farthest distance of any vertex from the origin
pub(crate) fn radius_of(arena: &PointArena, shape: &Polygon) -> f64 {
    shape.iter().map(|v| arena[v].length()).fold(0.0, f64::max)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::DVec2;

    /// `n x n` unit squares sharing their corners, centred on the origin,
    /// listed row by row from the bottom
    pub(crate) fn grid_patches(arena: &mut PointArena, n: usize) -> Vec<Patch> {
        let half = n as f64 / 2.0;
        let ids: Vec<Vec<PointId>> = (0..=n)
            .map(|y| {
                (0..=n)
                    .map(|x| arena.add(DVec2::new(x as f64 - half, y as f64 - half)))
                    .collect()
            })
            .collect();
        let mut patches = Vec::new();
        for y in 0..n {
            for x in 0..n {
                patches.push(Patch::new(Polygon::new(vec![
                    ids[y][x],
                    ids[y][x + 1],
                    ids[y + 1][x + 1],
                    ids[y + 1][x],
                ])));
            }
        }
        patches
    }

    #[test]
    fn test_neighbours_in_grid() {
        let mut arena = PointArena::new();
        let patches = grid_patches(&mut arena, 3);
        let mut n = neighbours(&patches, 4);
        n.sort();
        assert_eq!(n, vec![1, 3, 5, 7]);
        assert_eq!(neighbours(&patches, 0), vec![1, 3]);
    }

    #[test]
    fn test_neighbour_across_edge() {
        let mut arena = PointArena::new();
        let patches = grid_patches(&mut arena, 3);
        let v = patches[4].shape.get(1);
        assert_eq!(neighbour(&patches, 4, v), Some(5));
        let corner = patches[0].shape.get(0);
        assert_eq!(neighbour(&patches, 0, corner), None);
    }

    #[test]
    fn test_patches_by_vertex() {
        let mut arena = PointArena::new();
        let patches = grid_patches(&mut arena, 3);
        let centre_corner = patches[4].shape.get(0);
        assert_eq!(patches_by_vertex(&patches, centre_corner), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_circumference_of_grid() {
        let mut arena = PointArena::new();
        let patches = grid_patches(&mut arena, 3);
        let all: Vec<usize> = (0..9).collect();
        let rim = find_circumference(&patches, &all).unwrap();
        assert_eq!(rim.len(), 12);
        assert!((rim.area(&arena) - 9.0).abs() < 1e-9);
        assert!((radius_of(&arena, &rim) - 1.5 * 2f64.sqrt()).abs() < 1e-9);

        let single = find_circumference(&patches, &[4]).unwrap();
        assert_eq!(single, patches[4].shape);
    }

    #[test]
    fn test_enclosure() {
        let mut arena = PointArena::new();
        let mut patches = grid_patches(&mut arena, 3);
        for p in patches.iter_mut() {
            p.within_city = true;
        }
        patches[1].within_city = false;
        assert!(is_enclosed(&patches, 8));
        assert!(!is_enclosed(&patches, 4));
        patches[4].within_walls = true;
        assert!(is_enclosed(&patches, 4));
        assert!(!is_enclosed(&patches, 1));
    }
}
