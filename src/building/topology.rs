//! Routing graph over patch vertices
//!
//! Every patch vertex becomes a node, every patch edge a link priced by its
//! length. Wall vertices are blocked (except gates) so streets only cross the
//! wall through a gate.

use glam::DVec2;
use std::collections::HashMap;

use super::patch::Patch;
use crate::geom::{PointArena, PointId, Polygon};
use crate::graph::{Graph, NodeId};
#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// Street routing graph
pub struct Topology {
    graph: Graph,
    pt2node: HashMap<PointId, NodeId>,
    node2pt: Vec<PointId>,
    inner: Vec<NodeId>,
    outer: Vec<NodeId>,
    #[cfg(feature = "spatial-index")]
    index: SpatialIndex,
}

impl Topology {
    /// Build the graph for `patches`
    ///
    /// `blocked` vertices get nodes but no links. Vertices on `border` are
    /// neither inner nor outer.
    pub fn new(
        arena: &PointArena,
        patches: &[Patch],
        border: &Polygon,
        blocked: &[PointId],
    ) -> Self {
        let mut topology = Self {
            graph: Graph::new(),
            pt2node: HashMap::new(),
            node2pt: Vec::new(),
            inner: Vec::new(),
            outer: Vec::new(),
            #[cfg(feature = "spatial-index")]
            index: SpatialIndex::new(&[]),
        };

        for patch in patches {
            for (v0, v1) in patch.shape.edges() {
                let n0 = topology.process_point(v0, blocked);
                let n1 = topology.process_point(v1, blocked);
                for (v, n) in [(v0, n0), (v1, n1)] {
                    let Some(n) = n else { continue };
                    if border.contains(v) {
                        continue;
                    }
                    let list = if patch.within_city {
                        &mut topology.inner
                    } else {
                        &mut topology.outer
                    };
                    if !list.contains(&n) {
                        list.push(n);
                    }
                }
                if let (Some(n0), Some(n1)) = (n0, n1) {
                    topology.graph.link(n0, n1, arena[v0].distance(arena[v1]));
                }
            }
        }

        #[cfg(feature = "spatial-index")]
        {
            topology.index = SpatialIndex::new(&arena.positions(&topology.node2pt));
        }
        log::debug!(
            "topology: {} nodes, {} inner, {} outer",
            topology.node2pt.len(),
            topology.inner.len(),
            topology.outer.len()
        );
        topology
    }

    fn process_point(&mut self, v: PointId, blocked: &[PointId]) -> Option<NodeId> {
        let n = match self.pt2node.get(&v) {
            Some(&n) => n,
            None => {
                let n = self.graph.add();
                self.pt2node.insert(v, n);
                self.node2pt.push(v);
                n
            }
        };
        (!blocked.contains(&v)).then_some(n)
    }

    /// Nodes of city patches off the border
    pub fn inner(&self) -> &[NodeId] {
        &self.inner
    }

    /// Nodes of countryside patches off the border
    pub fn outer(&self) -> &[NodeId] {
        &self.outer
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn node(&self, v: PointId) -> Option<NodeId> {
        self.pt2node.get(&v).copied()
    }

    pub fn point(&self, n: NodeId) -> Option<PointId> {
        self.node2pt.get(n.index()).copied()
    }

    /// Shortest vertex path from `from` to `to`, listed from `to` back
    ///
    /// The endpoints themselves are never excluded. Empty when either end is
    /// unknown or no route avoids `exclude`.
    pub fn build_path(&self, from: PointId, to: PointId, exclude: &[NodeId]) -> Vec<PointId> {
        let (Some(start), Some(goal)) = (self.node(from), self.node(to)) else {
            return Vec::new();
        };
        let exclude: Vec<NodeId> = exclude
            .iter()
            .copied()
            .filter(|&n| n != start && n != goal)
            .collect();
        self.graph
            .a_star(start, goal, &exclude)
            .into_iter()
            .filter_map(|n| self.point(n))
            .collect()
    }

    /// Routing vertex closest to `position`
    pub fn nearest_point(&self, arena: &PointArena, position: DVec2) -> Option<PointId> {
        #[cfg(feature = "spatial-index")]
        {
            let _ = arena;
            self.index.find_nearest(position).map(|i| self.node2pt[i])
        }
        #[cfg(not(feature = "spatial-index"))]
        {
            self.node2pt
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    arena[a]
                        .distance_squared(position)
                        .total_cmp(&arena[b].distance_squared(position))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::patch::tests::grid_patches;
    use crate::building::patch::find_circumference;

    fn city_grid(arena: &mut PointArena) -> (Vec<Patch>, Polygon) {
        let mut patches = grid_patches(arena, 5);
        let inner: Vec<usize> = (1..4).flat_map(|y| (1..4).map(move |x| y * 5 + x)).collect();
        for &i in &inner {
            patches[i].within_city = true;
        }
        let border = find_circumference(&patches, &inner).unwrap();
        (patches, border)
    }

    #[test]
    fn test_nodes_and_lists() {
        let mut arena = PointArena::new();
        let (patches, border) = city_grid(&mut arena);
        let topology = Topology::new(&arena, &patches, &border, &[]);

        assert_eq!(topology.graph().len(), 36);
        // the four vertices strictly inside the walled block
        assert_eq!(topology.inner().len(), 4);
        // outer ring of the grid minus the wall rim
        assert_eq!(topology.outer().len(), 36 - 4 - 12);
    }

    #[test]
    fn test_path_follows_edges() {
        let mut arena = PointArena::new();
        let (patches, border) = city_grid(&mut arena);
        let topology = Topology::new(&arena, &patches, &border, &[]);

        let from = patches[0].shape.get(0);
        let to = patches[2].shape.get(0);
        let path = topology.build_path(from, to, &[]);
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], to);
        assert_eq!(path[2], from);
    }

    #[test]
    fn test_blocked_wall_forces_detour() {
        let mut arena = PointArena::new();
        let (patches, border) = city_grid(&mut arena);
        let gate = border.get(1);
        let blocked: Vec<PointId> = border.iter().filter(|&v| v != gate).collect();
        let topology = Topology::new(&arena, &patches, &border, &blocked);

        let centre = patches[12].shape.get(0);
        let outside = patches[0].shape.get(0);
        let path = topology.build_path(outside, centre, topology.outer());
        // every neighbour of the start is an outer node
        assert!(path.is_empty());

        let path = topology.build_path(outside, centre, &[]);
        assert!(path.contains(&gate));
        assert!(path.iter().all(|v| v == &gate || !blocked.contains(v)));
    }

    #[test]
    fn test_nearest_point() {
        let mut arena = PointArena::new();
        let (patches, border) = city_grid(&mut arena);
        let topology = Topology::new(&arena, &patches, &border, &[]);

        let far = topology.nearest_point(&arena, DVec2::new(1000.0, 1000.0)).unwrap();
        assert_eq!(arena[far], DVec2::new(2.5, 2.5));
        assert!(topology.node(far).is_some());
    }
}
