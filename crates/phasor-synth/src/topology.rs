//! Device connectivity.
//!
//! A [`Topology`] is an undirected simple graph over the qubits `0..n`.
//! Two-qubit gates emitted by synthesis may only act on its edges.

use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use phasor_ir::Circuit;

use crate::error::{SynthError, SynthResult};

/// Marker for "no distance / no predecessor" in the cached matrices.
const UNREACHABLE: u32 = u32::MAX;

/// Target device connectivity graph.
///
/// ## Performance
///
/// On construction, all-pairs distance and predecessor matrices are computed
/// by BFS from every qubit, so `distance()` is O(1) and `shortest_path()` is
/// O(distance). Adjacency lists are kept sorted so that every traversal, and
/// therefore every synthesis result, is deterministic.
///
/// ## Deserialization
///
/// Only the qubit count and edge list are serialized. Deserialization
/// validates the edge list and rebuilds the caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TopologySpec", into = "TopologySpec")]
pub struct Topology {
    /// Number of physical qubits.
    num_qubits: u32,
    /// Undirected edges, as given.
    edges: Vec<(u32, u32)>,
    /// Sorted adjacency lists.
    adjacency: Vec<Vec<u32>>,
    /// `dist_matrix[from][to]`, or `UNREACHABLE`.
    dist_matrix: Vec<Vec<u32>>,
    /// `pred_matrix[from][to]` is the qubit before `to` on a shortest path
    /// from `from`.
    pred_matrix: Vec<Vec<u32>>,
}

/// Serialized form of a [`Topology`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySpec {
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Undirected edge list.
    #[serde(default)]
    pub edges: Vec<(u32, u32)>,
}

impl TryFrom<TopologySpec> for Topology {
    type Error = SynthError;

    fn try_from(spec: TopologySpec) -> SynthResult<Self> {
        Topology::from_edges(spec.num_qubits, spec.edges)
    }
}

impl From<Topology> for TopologySpec {
    fn from(topology: Topology) -> Self {
        TopologySpec {
            num_qubits: topology.num_qubits,
            edges: topology.edges,
        }
    }
}

impl PartialEq for Topology {
    fn eq(&self, other: &Self) -> bool {
        self.num_qubits == other.num_qubits && self.edges == other.edges
    }
}

impl Eq for Topology {}

impl Topology {
    /// Build a topology from an edge list.
    ///
    /// Fails on self loops, duplicate edges (in either orientation) and
    /// endpoints outside `0..num_qubits`.
    pub fn from_edges(
        num_qubits: u32,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> SynthResult<Self> {
        let edges: Vec<(u32, u32)> = edges.into_iter().collect();
        let mut seen = FxHashSet::default();
        for &(a, b) in &edges {
            if a >= num_qubits || b >= num_qubits {
                return Err(SynthError::InvalidTopology(format!(
                    "edge ({a}, {b}) has an endpoint outside 0..{num_qubits}"
                )));
            }
            if a == b {
                return Err(SynthError::InvalidTopology(format!(
                    "self loop on qubit {a}"
                )));
            }
            if !seen.insert((a.min(b), a.max(b))) {
                return Err(SynthError::InvalidTopology(format!(
                    "duplicate edge ({a}, {b})"
                )));
            }
        }
        Ok(Self::build(num_qubits, edges))
    }

    /// Linear chain `0-1-2-…`.
    pub fn line(n: u32) -> Self {
        Self::build(n, (1..n).map(|i| (i - 1, i)).collect())
    }

    /// Ring `0-1-…-(n-1)-0`. Falls back to a line below three qubits.
    pub fn cycle(n: u32) -> Self {
        if n < 3 {
            return Self::line(n);
        }
        let mut edges: Vec<(u32, u32)> = (1..n).map(|i| (i - 1, i)).collect();
        edges.push((n - 1, 0));
        Self::build(n, edges)
    }

    /// Square grid with `rows × cols` qubits, numbered row-major.
    ///
    /// Fails if the qubit count does not fit in a `u32`.
    pub fn grid(rows: u32, cols: u32) -> SynthResult<Self> {
        let num_qubits = rows.checked_mul(cols).ok_or_else(|| {
            SynthError::InvalidTopology(format!("grid {rows}x{cols} has too many qubits"))
        })?;
        let mut edges = vec![];
        for r in 0..rows {
            for c in 0..cols {
                let q = r * cols + c;
                if c + 1 < cols {
                    edges.push((q, q + 1));
                }
                if r + 1 < rows {
                    edges.push((q, q + cols));
                }
            }
        }
        Ok(Self::build(num_qubits, edges))
    }

    /// Fully connected topology.
    pub fn complete(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self::build(n, edges)
    }

    /// Star topology with qubit 0 at the centre.
    pub fn star(n: u32) -> Self {
        Self::build(n, (1..n).map(|i| (0, i)).collect())
    }

    fn build(num_qubits: u32, edges: Vec<(u32, u32)>) -> Self {
        let mut topology = Self {
            num_qubits,
            edges,
            adjacency: vec![],
            dist_matrix: vec![],
            pred_matrix: vec![],
        };
        topology.rebuild_caches();
        topology
    }

    /// Rebuild the adjacency lists and distance/predecessor matrices from the
    /// edge list.
    fn rebuild_caches(&mut self) {
        let n = self.num_qubits as usize;
        self.adjacency = vec![vec![]; n];
        for &(a, b) in &self.edges {
            self.adjacency[a as usize].push(b);
            self.adjacency[b as usize].push(a);
        }
        for list in &mut self.adjacency {
            list.sort_unstable();
        }

        let alive = vec![true; n];
        self.dist_matrix = Vec::with_capacity(n);
        self.pred_matrix = Vec::with_capacity(n);
        for src in 0..n as u32 {
            let (dist, pred) = self.bfs_within(&[src], &alive);
            self.dist_matrix.push(dist);
            self.pred_matrix.push(pred);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The edge list.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Neighbours of `qubit`, ascending. Empty for out-of-range qubits.
    pub fn neighbors(&self, qubit: u32) -> &[u32] {
        self.adjacency
            .get(qubit as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True if `a` and `b` are adjacent.
    #[inline]
    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Hop distance between two qubits.
    pub fn distance(&self, from: u32, to: u32) -> SynthResult<u32> {
        self.check_qubit(from)?;
        self.check_qubit(to)?;
        match self.dist_matrix[from as usize][to as usize] {
            UNREACHABLE => Err(SynthError::Disconnected { from, to }),
            d => Ok(d),
        }
    }

    /// A shortest path from `from` to `to`, both endpoints included.
    pub fn shortest_path(&self, from: u32, to: u32) -> SynthResult<Vec<u32>> {
        self.distance(from, to)?;
        let preds = &self.pred_matrix[from as usize];
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = preds[current as usize];
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }

    /// True if every qubit can reach every other.
    pub fn is_connected(&self) -> bool {
        self.num_qubits <= 1 || self.component_count(&vec![true; self.num_qubits as usize]) == 1
    }

    /// True if `a` and `b` lie in the same connected component.
    pub fn same_component(&self, a: u32, b: u32) -> bool {
        a < self.num_qubits
            && b < self.num_qubits
            && self.dist_matrix[a as usize][b as usize] != UNREACHABLE
    }

    /// True if removing `qubit` from the subgraph induced by `alive` splits
    /// its component. Dead qubits are never cutting.
    pub fn is_cutting(&self, qubit: u32, alive: &[bool]) -> bool {
        if !alive.get(qubit as usize).copied().unwrap_or(false) {
            return false;
        }
        let before = self.component_count(alive);
        let mut without = alive.to_vec();
        without[qubit as usize] = false;
        self.component_count(&without) > before
    }

    /// Number of connected components of the subgraph induced by `alive`.
    pub fn component_count(&self, alive: &[bool]) -> usize {
        let mut graph = UnGraph::<u32, ()>::default();
        let index: Vec<_> = (0..self.num_qubits)
            .map(|q| alive[q as usize].then(|| graph.add_node(q)))
            .collect();
        for &(a, b) in &self.edges {
            if let (Some(ia), Some(ib)) = (index[a as usize], index[b as usize]) {
                graph.add_edge(ia, ib, ());
            }
        }
        connected_components(&graph)
    }

    /// Multi-source BFS restricted to `alive` qubits.
    ///
    /// Returns `(dist, pred)`; unreached qubits and sources have `pred` set
    /// to `u32::MAX`. Neighbours are visited in ascending order.
    pub(crate) fn bfs_within(&self, sources: &[u32], alive: &[bool]) -> (Vec<u32>, Vec<u32>) {
        let n = self.num_qubits as usize;
        let mut dist = vec![UNREACHABLE; n];
        let mut pred = vec![UNREACHABLE; n];
        let mut queue = VecDeque::new();
        for &s in sources {
            if alive[s as usize] && dist[s as usize] == UNREACHABLE {
                dist[s as usize] = 0;
                queue.push_back(s);
            }
        }
        while let Some(current) = queue.pop_front() {
            let cur = current as usize;
            for &next in &self.adjacency[cur] {
                let nx = next as usize;
                if alive[nx] && dist[nx] == UNREACHABLE {
                    dist[nx] = dist[cur] + 1;
                    pred[nx] = current;
                    queue.push_back(next);
                }
            }
        }
        (dist, pred)
    }

    fn check_qubit(&self, qubit: u32) -> SynthResult<()> {
        if qubit < self.num_qubits {
            Ok(())
        } else {
            Err(SynthError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            })
        }
    }

    // =========================================================================
    // Steiner trees
    // =========================================================================

    /// Approximate minimum Steiner tree spanning `terminals`.
    ///
    /// Greedy shortest-path heuristic: grow a tree from the smallest terminal,
    /// repeatedly attaching the nearest unconnected terminal (ties broken by
    /// the lower index) along a BFS shortest path. The result is within a
    /// factor `2·(1 − 1/|S|)` of optimal.
    pub fn steiner_subgraph(&self, terminals: &[u32]) -> SynthResult<SteinerTree> {
        for &t in terminals {
            self.check_qubit(t)?;
        }
        let root = terminals.iter().copied().min().ok_or_else(|| {
            SynthError::InvalidConfig("Steiner tree needs at least one terminal".into())
        })?;
        let alive = vec![true; self.num_qubits as usize];
        self.steiner_tree(root, terminals, &alive)
    }

    /// Steiner tree rooted at `root`, using only `alive` qubits.
    pub fn steiner_tree(
        &self,
        root: u32,
        terminals: &[u32],
        alive: &[bool],
    ) -> SynthResult<SteinerTree> {
        let n = self.num_qubits as usize;
        self.check_qubit(root)?;
        for &t in terminals {
            self.check_qubit(t)?;
            if !alive[t as usize] {
                return Err(SynthError::InfeasibleTopology(format!(
                    "terminal {t} is not available"
                )));
            }
        }
        if !alive[root as usize] {
            return Err(SynthError::InfeasibleTopology(format!(
                "root {root} is not available"
            )));
        }

        let mut in_tree = vec![false; n];
        in_tree[root as usize] = true;
        let mut vertices = vec![root];
        let mut edges = vec![];
        let mut remaining: BTreeSet<u32> =
            terminals.iter().copied().filter(|&t| t != root).collect();

        while !remaining.is_empty() {
            let (dist, pred) = self.bfs_within(&vertices, alive);
            let mut nearest = None;
            for &t in &remaining {
                let d = dist[t as usize];
                if d != UNREACHABLE && nearest.is_none_or(|(_, best)| d < best) {
                    nearest = Some((t, d));
                }
            }
            let Some((target, _)) = nearest else {
                return Err(SynthError::InfeasibleTopology(format!(
                    "terminals {remaining:?} cannot be reached from qubit {root}"
                )));
            };

            let mut path = vec![target];
            let mut current = target;
            while !in_tree[current as usize] {
                current = pred[current as usize];
                path.push(current);
            }
            path.reverse();
            for pair in path.windows(2) {
                let (parent, child) = (pair[0], pair[1]);
                in_tree[child as usize] = true;
                vertices.push(child);
                edges.push((parent, child));
                remaining.remove(&child);
            }
        }

        let mut terminal_set: Vec<u32> = terminals.to_vec();
        terminal_set.push(root);
        terminal_set.sort_unstable();
        terminal_set.dedup();
        Ok(SteinerTree {
            root,
            vertices,
            edges,
            terminals: terminal_set,
        })
    }
}

/// A tree in a [`Topology`] connecting a set of terminals.
///
/// Edges are oriented `(parent, child)` and listed in insertion order, so a
/// parent always appears before any edge leading to its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteinerTree {
    root: u32,
    vertices: Vec<u32>,
    edges: Vec<(u32, u32)>,
    terminals: Vec<u32>,
}

impl SteinerTree {
    /// The root vertex.
    pub fn root(&self) -> u32 {
        self.root
    }

    /// Vertices in insertion order, root first.
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// `(parent, child)` edges in insertion order.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Sorted terminals (the root included).
    pub fn terminals(&self) -> &[u32] {
        &self.terminals
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// True if `qubit` is a vertex of the tree.
    pub fn contains(&self, qubit: u32) -> bool {
        self.vertices.contains(&qubit)
    }

    /// True if `qubit` is a terminal.
    pub fn is_terminal(&self, qubit: u32) -> bool {
        self.terminals.binary_search(&qubit).is_ok()
    }

    /// Non-terminal vertices, in insertion order.
    pub fn steiner_vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.vertices.iter().copied().filter(|&v| !self.is_terminal(v))
    }

    /// Children of `qubit`, in insertion order.
    pub fn children(&self, qubit: u32) -> Vec<u32> {
        self.edges
            .iter()
            .filter(|&&(parent, _)| parent == qubit)
            .map(|&(_, child)| child)
            .collect()
    }
}

/// Connectivity check for synthesized circuits.
pub trait RespectsTopology {
    /// True if every two-qubit gate acts on an edge of `topology`.
    fn respects(&self, topology: &Topology) -> bool;
}

impl RespectsTopology for Circuit {
    fn respects(&self, topology: &Topology) -> bool {
        self.num_qubits() <= topology.num_qubits()
            && self
                .two_qubit_pairs()
                .all(|(control, target)| topology.has_edge(control, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_edges_rejected() {
        assert!(matches!(
            Topology::from_edges(2, [(0, 0)]),
            Err(SynthError::InvalidTopology(_))
        ));
        assert!(matches!(
            Topology::from_edges(3, [(0, 1), (1, 0)]),
            Err(SynthError::InvalidTopology(_))
        ));
        assert!(matches!(
            Topology::from_edges(2, [(0, 2)]),
            Err(SynthError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_line_distances() {
        let line = Topology::line(5);
        assert_eq!(line.distance(0, 4).unwrap(), 4);
        assert_eq!(line.shortest_path(4, 1).unwrap(), vec![4, 3, 2, 1]);
        assert_eq!(line.neighbors(2), &[1, 3]);
        assert!(line.is_connected());
    }

    #[test]
    fn test_cycle_and_grid() {
        let ring = Topology::cycle(4);
        assert_eq!(ring.distance(0, 2).unwrap(), 2);
        assert_eq!(ring.neighbors(0), &[1, 3]);

        let grid = Topology::grid(2, 3).unwrap();
        assert_eq!(grid.num_qubits(), 6);
        assert_eq!(grid.edges().len(), 7);
        assert_eq!(grid.distance(0, 5).unwrap(), 3);
    }

    #[test]
    fn test_grid_too_large() {
        assert!(matches!(
            Topology::grid(u32::MAX, 2),
            Err(SynthError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_disconnected() {
        let t = Topology::from_edges(4, [(0, 1), (2, 3)]).unwrap();
        assert!(!t.is_connected());
        assert!(matches!(
            t.distance(0, 3),
            Err(SynthError::Disconnected { from: 0, to: 3 })
        ));
        assert!(t.same_component(2, 3));
        assert!(!t.same_component(1, 2));
        assert!(matches!(
            t.steiner_subgraph(&[0, 2]),
            Err(SynthError::InfeasibleTopology(_))
        ));
    }

    #[test]
    fn test_out_of_range_query() {
        let t = Topology::line(2);
        assert!(matches!(
            t.distance(0, 7),
            Err(SynthError::QubitOutOfRange { qubit: 7, .. })
        ));
        assert!(t.neighbors(9).is_empty());
    }

    #[test]
    fn test_cut_vertices() {
        let line = Topology::line(4);
        let alive = vec![true; 4];
        assert!(!line.is_cutting(0, &alive));
        assert!(line.is_cutting(1, &alive));
        assert!(!line.is_cutting(3, &alive));

        let ring = Topology::cycle(4);
        assert!((0..4).all(|q| !ring.is_cutting(q, &alive)));
    }

    #[test]
    fn test_steiner_tree_on_line() {
        let line = Topology::line(5);
        let tree = line.steiner_subgraph(&[3, 0]).unwrap();
        assert_eq!(tree.root(), 0);
        assert_eq!(tree.edges(), &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(tree.steiner_vertices().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(tree.children(1), vec![2]);
    }

    #[test]
    fn test_steiner_tree_star() {
        let star = Topology::star(4);
        let tree = star.steiner_subgraph(&[1, 2, 3]).unwrap();
        assert_eq!(tree.root(), 1);
        assert_eq!(tree.num_edges(), 3);
        assert!(tree.contains(0));
        assert!(!tree.is_terminal(0));
    }

    #[test]
    fn test_steiner_tree_single_terminal() {
        let tree = Topology::line(3).steiner_subgraph(&[2]).unwrap();
        assert_eq!(tree.vertices(), &[2]);
        assert!(tree.edges().is_empty());
    }

    #[test]
    fn test_serde_rebuilds_caches() {
        let ring = Topology::cycle(5);
        let json = serde_json::to_string(&ring).unwrap();
        let back: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ring);
        assert_eq!(back.distance(0, 2).unwrap(), 2);

        let bad = r#"{"num_qubits": 2, "edges": [[0, 0]]}"#;
        assert!(serde_json::from_str::<Topology>(bad).is_err());
    }

    #[test]
    fn test_respects() {
        let line = Topology::line(3);
        let mut ok = Circuit::new(3);
        ok.cx(0, 1).unwrap().cx(2, 1).unwrap();
        assert!(ok.respects(&line));

        let mut bad = Circuit::new(3);
        bad.cx(0, 2).unwrap();
        assert!(!bad.respects(&line));
    }
}
