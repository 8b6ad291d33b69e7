//! Shortest-path oracle trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The matrix engine calls routing through [`ShortestPathOracle`], so a
//! different search (A*, bidirectional Dijkstra) can be dropped in without
//! touching the engine.
//!
//! # Costs
//!
//! The oracle reads only each edge's **active** sample, i.e. whichever trial
//! was last materialized with [`Graph::materialize`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use mcr_core::{EdgeId, NodeId};

use crate::graph::Graph;
use crate::{RouteError, RouteResult};

// ── PathResult ────────────────────────────────────────────────────────────────

/// One shortest-path answer with totals accumulated in traversal order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Sum of active composite weights.
    pub weight: f64,
    /// Visited nodes, source first, destination last.
    pub nodes: Vec<NodeId>,
    /// Traversed edges in order.
    pub edges: Vec<EdgeId>,
    /// Seconds.
    pub total_time: f64,
    pub total_distance: f64,
    /// Signed; climbs positive, descents negative.
    pub total_elevation: f64,
    pub total_fuel: f64,
}

impl PathResult {
    /// The zero-length path from a node to itself.
    pub fn trivial(node: NodeId) -> Self {
        Self {
            weight: 0.0,
            nodes: vec![node],
            edges: Vec::new(),
            total_time: 0.0,
            total_distance: 0.0,
            total_elevation: 0.0,
            total_fuel: 0.0,
        }
    }

    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// `true` if `node` lies anywhere on the path, endpoints included.
    #[inline]
    pub fn visits(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// `true` if both paths traverse the same edges in the same order.
    #[inline]
    pub fn same_route(&self, other: &PathResult) -> bool {
        self.edges == other.edges
    }
}

// ── ShortestPathOracle ────────────────────────────────────────────────────────

/// Pluggable single-pair shortest-path search.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one oracle can be shared by the
/// rayon workers of a parallel matrix build.
pub trait ShortestPathOracle: Send + Sync {
    /// Cheapest path from `from` to `to` under the graph's active weights.
    ///
    /// `from == to` yields [`PathResult::trivial`].  Unreachable
    /// destinations yield [`RouteError::NoPathFound`].
    fn shortest_path(&self, graph: &Graph, from: NodeId, to: NodeId) -> RouteResult<PathResult>;
}

// ── DijkstraOracle ────────────────────────────────────────────────────────────

/// Binary-heap Dijkstra over the arena graph.
///
/// Equal-cost heap entries pop in ascending `NodeId` order, so results are
/// deterministic for a given graph and trial.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraOracle;

impl ShortestPathOracle for DijkstraOracle {
    fn shortest_path(&self, graph: &Graph, from: NodeId, to: NodeId) -> RouteResult<PathResult> {
        dijkstra(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total-ordered `f64` heap key.  Weights are always finite and positive
/// after generation; `total_cmp` keeps the ordering total regardless.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(graph: &Graph, from: NodeId, to: NodeId) -> RouteResult<PathResult> {
    if !graph.contains_node(from) {
        return Err(RouteError::NodeNotFound(from));
    }
    if !graph.contains_node(to) {
        return Err(RouteError::NodeNotFound(to));
    }
    if from == to {
        return Ok(PathResult::trivial(from));
    }

    let n = graph.node_slots();
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = edge that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut settled   = vec![false; n];

    dist[from.index()] = 0.0;

    // Reverse turns the max-heap into a min-heap; NodeId breaks ties.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, cost));
        }
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;

        for &e in graph.incident(node) {
            let Some(edge) = graph.edge(e) else { continue };
            let neighbor = edge.other(node);
            if settled[neighbor.index()] {
                continue;
            }
            let new_cost = cost + edge.active.weight;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = e;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(RouteError::NoPathFound { from, to })
}

/// Walk the predecessor chain back from `to`, then accumulate totals in
/// traversal order so the elevation sign follows the direction of travel.
fn reconstruct(graph: &Graph, prev_edge: &[EdgeId], from: NodeId, to: NodeId, weight: f64) -> PathResult {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        let Some(edge) = graph.edge(e) else { break };
        edges.push(e);
        cur = edge.other(cur);
    }
    edges.reverse();

    let mut path = PathResult::trivial(from);
    path.weight = weight;
    let mut at = from;
    for &e in &edges {
        let Some(edge) = graph.edge(e) else { continue };
        path.total_time      += edge.active.time;
        path.total_fuel      += edge.active.fuel;
        path.total_distance  += edge.distance;
        path.total_elevation += edge.elevation_from(at);
        at = edge.other(at);
        path.nodes.push(at);
    }
    path.edges = edges;
    path
}
