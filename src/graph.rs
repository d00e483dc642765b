//! Weighted node graph with A* search
//!
//! Nodes live in a slot vector addressed by [`NodeId`]; removing a node clears
//! every link pointing at it and leaves its slot empty so other ids stay valid.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

/// Handle to a node of a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outgoing links of a node with their prices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    links: BTreeMap<NodeId, f64>,
}

impl Node {
    pub fn links(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.links.iter().map(|(&n, &w)| (n, w))
    }

    #[inline]
    pub fn price_to(&self, other: NodeId) -> Option<f64> {
        self.links.get(&other).copied()
    }
}

/// Graph of weighted links, symmetric unless linked with
/// [`Graph::link_directed`]
///
/// # Example
///
/// ```
/// use rust_voronoi_town::Graph;
///
/// let mut graph = Graph::new();
/// let a = graph.add();
/// let b = graph.add();
/// let c = graph.add();
/// graph.link(a, b, 1.0);
/// graph.link(b, c, 2.0);
///
/// let path = graph.a_star(a, c, &[]);
/// assert_eq!(path, vec![c, b, a]);
/// assert_eq!(graph.calculate_price(&path), Some(3.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self) -> NodeId {
        self.nodes.push(Some(Node::default()));
        NodeId(self.nodes.len() - 1)
    }

    /// Remove a node and every link that points at it
    pub fn remove(&mut self, id: NodeId) {
        self.unlink_all(id);
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = None;
        }
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Link both ways with the same price
    pub fn link(&mut self, a: NodeId, b: NodeId, price: f64) {
        self.link_directed(a, b, price);
        self.link_directed(b, a, price);
    }

    /// Link `a -> b` only
    pub fn link_directed(&mut self, a: NodeId, b: NodeId, price: f64) {
        if !self.contains(b) {
            return;
        }
        if let Some(Some(node)) = self.nodes.get_mut(a.0) {
            node.links.insert(b, price);
        }
    }

    /// Remove the link in both directions
    pub fn unlink(&mut self, a: NodeId, b: NodeId) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(Some(node)) = self.nodes.get_mut(from.0) {
                node.links.remove(&to);
            }
        }
    }

    /// Remove every link into or out of `id`
    pub fn unlink_all(&mut self, id: NodeId) {
        if let Some(Some(node)) = self.nodes.get_mut(id.0) {
            node.links.clear();
        }
        for node in self.nodes.iter_mut().flatten() {
            node.links.remove(&id);
        }
    }

    /// Cheapest path from `start` to `goal`, listed goal first
    ///
    /// Nodes in `exclude` are never entered. Returns `[start]` when the two
    /// coincide and an empty path when `goal` is unreachable. A node reached
    /// again at equal cost keeps its first predecessor.
    pub fn a_star(&self, start: NodeId, goal: NodeId, exclude: &[NodeId]) -> Vec<NodeId> {
        if !self.contains(start) || !self.contains(goal) {
            return Vec::new();
        }
        if exclude.contains(&start) || exclude.contains(&goal) {
            return Vec::new();
        }

        let mut closed: HashSet<NodeId> = exclude.iter().copied().collect();
        let mut g_score: HashMap<NodeId, f64> = HashMap::from([(start, 0.0)]);
        let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
        let mut open = BinaryHeap::new();
        let mut seq = 0;
        open.push(OpenEntry {
            cost: 0.0,
            seq,
            node: start,
        });

        while let Some(OpenEntry { cost, node, .. }) = open.pop() {
            if closed.contains(&node) || g_score.get(&node).is_some_and(|&g| cost > g) {
                continue;
            }
            if node == goal {
                return build_path(&came_from, goal);
            }
            closed.insert(node);

            let Some(current) = self.node(node) else {
                continue;
            };
            for (neighbour, price) in current.links() {
                if closed.contains(&neighbour) {
                    continue;
                }
                let score = cost + price;
                let better = g_score.get(&neighbour).map_or(true, |&g| score < g);
                if better {
                    g_score.insert(neighbour, score);
                    came_from.insert(neighbour, node);
                    seq += 1;
                    open.push(OpenEntry {
                        cost: score,
                        seq,
                        node: neighbour,
                    });
                }
            }
        }
        Vec::new()
    }

    /// Sum of link prices along `path`
    ///
    /// `None` when two consecutive nodes are not linked; `Some(0.0)` for
    /// paths shorter than two nodes.
    pub fn calculate_price(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2).try_fold(0.0, |total, pair| {
            self.node(pair[0])
                .and_then(|n| n.price_to(pair[1]))
                .map(|price| total + price)
        })
    }
}

fn build_path(came_from: &HashMap<NodeId, NodeId>, goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path
}

/// Open-set entry ordered so the heap pops the lowest cost, oldest first
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    cost: f64,
    seq: usize,
    node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> (Graph, [NodeId; 4]) {
        let mut graph = Graph::new();
        let n = [graph.add(), graph.add(), graph.add(), graph.add()];
        graph.link(n[0], n[1], 1.0);
        graph.link(n[0], n[2], 2.0);
        graph.link(n[1], n[3], 3.0);
        graph.link(n[2], n[3], 1.0);
        (graph, n)
    }

    #[test]
    fn test_diamond_cheapest_path() {
        let (graph, n) = diamond();
        let path = graph.a_star(n[0], n[3], &[]);
        assert_eq!(path, vec![n[3], n[2], n[0]]);
        assert_eq!(graph.calculate_price(&path), Some(3.0));
    }

    #[test]
    fn test_single_node_path() {
        let (graph, n) = diamond();
        assert_eq!(graph.a_star(n[1], n[1], &[]), vec![n[1]]);
        assert_eq!(graph.calculate_price(&[n[1]]), Some(0.0));
    }

    #[test]
    fn test_disconnected_is_empty() {
        let (mut graph, n) = diamond();
        let island = graph.add();
        assert!(graph.a_star(n[0], island, &[]).is_empty());
    }

    #[test]
    fn test_exclude_forces_detour() {
        let (graph, n) = diamond();
        let path = graph.a_star(n[0], n[3], &[n[2]]);
        assert_eq!(path, vec![n[3], n[1], n[0]]);
        assert_eq!(graph.calculate_price(&path), Some(4.0));

        let blocked = graph.a_star(n[0], n[3], &[n[1], n[2]]);
        assert!(blocked.is_empty());
    }

    #[test]
    fn test_ties_keep_first_route() {
        let mut graph = Graph::new();
        let n: Vec<NodeId> = (0..4).map(|_| graph.add()).collect();
        graph.link(n[0], n[1], 1.0);
        graph.link(n[0], n[2], 1.0);
        graph.link(n[1], n[3], 1.0);
        graph.link(n[2], n[3], 1.0);
        assert_eq!(graph.a_star(n[0], n[3], &[]), vec![n[3], n[1], n[0]]);
    }

    #[test]
    fn test_invalid_path_price() {
        let (graph, n) = diamond();
        assert_eq!(graph.calculate_price(&[n[0], n[3]]), None);
        assert_eq!(graph.calculate_price(&[]), Some(0.0));
    }

    #[test]
    fn test_directed_links() {
        let mut graph = Graph::new();
        let a = graph.add();
        let b = graph.add();
        graph.link_directed(a, b, 1.0);
        assert_eq!(graph.a_star(a, b, &[]), vec![b, a]);
        assert!(graph.a_star(b, a, &[]).is_empty());
    }

    #[test]
    fn test_remove_clears_back_links() {
        let (mut graph, n) = diamond();
        graph.remove(n[2]);
        assert!(!graph.contains(n[2]));
        assert_eq!(graph.len(), 3);
        assert!(graph.node(n[0]).unwrap().price_to(n[2]).is_none());
        assert_eq!(graph.a_star(n[0], n[3], &[]), vec![n[3], n[1], n[0]]);

        graph.unlink(n[1], n[3]);
        assert!(graph.a_star(n[0], n[3], &[]).is_empty());
    }
}
