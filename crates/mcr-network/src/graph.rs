//! Location graph and builder.
//!
//! # Data layout
//!
//! The graph is an **arena**: nodes and edges live in `Vec<Option<_>>` slots
//! addressed by [`NodeId`] / [`EdgeId`].  Removing a node empties its slot
//! (and the slots of its incident edges) without shifting anything else, so
//! every other id, and every path-matrix key built from those ids, stays
//! valid.  Slots are never reused.
//!
//! Adjacency is a per-node-slot `Vec<EdgeId>` rather than the CSR layout a
//! static road network would use, because nodes are added and removed while
//! the simulation runs.
//!
//! # Active sample
//!
//! Each edge stores its per-trial vectors plus one **active** sample.  The
//! shortest-path oracle reads only the active sample; [`Graph::materialize`]
//! copies trial *t* into it.

use std::collections::HashMap;

use mcr_core::{DistanceSource, EdgeId, GeoPoint, NodeId, Position};

use crate::cost;
use crate::{GraphError, GraphResult};

// ── Node ──────────────────────────────────────────────────────────────────────

/// Named attributes of a location.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeAttrs {
    /// Plane coordinate (required).
    pub pos: Position,
    /// True-world coordinate, if known.
    pub world: Option<GeoPoint>,
    /// Elevation in map units.  Defaults to 0.
    pub elevation: f64,
    /// Probability that the next emergency originates here.
    pub emergency_probability: Option<f64>,
}

impl NodeAttrs {
    /// Attributes with only a plane position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            pos: Position::new(x, y),
            world: None,
            elevation: 0.0,
            emergency_probability: None,
        }
    }

    pub fn with_world(mut self, lat: f64, lon: f64) -> Self {
        self.world = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_emergency_probability(mut self, p: f64) -> Self {
        self.emergency_probability = Some(p);
        self
    }

    /// Reason the attributes are unusable, or `None` if they are fine.
    fn problem(&self) -> Option<String> {
        if !self.pos.is_finite() {
            return Some(format!("position {} is not finite", self.pos));
        }
        if self.world.is_some_and(|w| !w.is_finite()) {
            return Some("world coordinate is not finite".to_owned());
        }
        if !self.elevation.is_finite() {
            return Some(format!("elevation {} is not finite", self.elevation));
        }
        if let Some(p) = self.emergency_probability {
            if !(0.0..=1.0).contains(&p) {
                return Some(format!("emergency probability {p} is outside [0, 1]"));
            }
        }
        None
    }
}

/// A named location owned by the graph.
#[derive(Clone, Debug)]
pub struct Node {
    pub name:  String,
    pub attrs: NodeAttrs,
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// One trial's values for an edge.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EdgeSample {
    pub time:   f64,
    pub fuel:   f64,
    pub weight: f64,
}

/// Per-trial vectors written by the weight generator.  Once generated, all
/// four vectors have exactly `trials` entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrialVectors {
    pub time:       Vec<f64>,
    pub fuel:       Vec<f64>,
    pub obstructed: Vec<bool>,
    pub weight:     Vec<f64>,
}

impl TrialVectors {
    #[inline]
    pub fn len(&self) -> usize {
        self.weight.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    /// Trial `t` as an [`EdgeSample`], or `None` if out of range.
    #[inline]
    pub fn sample(&self, t: usize) -> Option<EdgeSample> {
        Some(EdgeSample {
            time:   *self.time.get(t)?,
            fuel:   *self.fuel.get(t)?,
            weight: *self.weight.get(t)?,
        })
    }
}

/// Input description of an undirected edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSpec {
    /// Chance the edge is obstructed in any one trial.
    pub obstruction_probability: f64,
    /// Historical travel times in seconds.
    pub time_samples: Vec<f64>,
}

impl EdgeSpec {
    pub fn new(obstruction_probability: f64, time_samples: Vec<f64>) -> Self {
        Self { obstruction_probability, time_samples }
    }

    fn problem(&self) -> Option<String> {
        if !(0.0..=1.0).contains(&self.obstruction_probability) {
            return Some(format!(
                "obstruction probability {} is outside [0, 1]",
                self.obstruction_probability
            ));
        }
        if self.time_samples.is_empty() {
            return Some("no historical time samples".to_owned());
        }
        if let Some(t) = self.time_samples.iter().find(|t| !(t.is_finite() && **t > 0.0)) {
            return Some(format!("time sample {t} is not a positive number"));
        }
        None
    }
}

/// An undirected road segment between `a` and `b`.
#[derive(Clone, Debug)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub obstruction_probability: f64,
    pub time_samples: Vec<f64>,
    /// Static length (plane units or metres, per [`DistanceSource`]).
    pub distance: f64,
    /// Elevation of `b` minus elevation of `a`.
    pub elevation_delta: f64,
    pub trials: TrialVectors,
    /// The materialized trial read by the shortest-path oracle.
    pub active: EdgeSample,
}

impl Edge {
    /// The endpoint opposite `node`.
    #[inline]
    pub fn other(&self, node: NodeId) -> NodeId {
        if node == self.a { self.b } else { self.a }
    }

    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// Signed elevation change when traversing away from `from`.
    #[inline]
    pub fn elevation_from(&self, from: NodeId) -> f64 {
        if from == self.a { self.elevation_delta } else { -self.elevation_delta }
    }
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Undirected location graph with stable arena ids.
///
/// Construct through [`GraphBuilder`]; edit with [`insert_node`],
/// [`insert_edge`], and [`remove_node`].
///
/// [`insert_node`]: Graph::insert_node
/// [`insert_edge`]: Graph::insert_edge
/// [`remove_node`]: Graph::remove_node
#[derive(Clone, Debug)]
pub struct Graph {
    nodes:     Vec<Option<Node>>,
    edges:     Vec<Option<Edge>>,
    adjacency: Vec<Vec<EdgeId>>,
    names:     HashMap<String, NodeId>,
    distance_source: DistanceSource,
    live_nodes: usize,
    live_edges: usize,
}

impl Graph {
    /// An empty graph measuring edges with `distance_source`.
    pub fn new(distance_source: DistanceSource) -> Self {
        Self {
            nodes:     Vec::new(),
            edges:     Vec::new(),
            adjacency: Vec::new(),
            names:     HashMap::new(),
            distance_source,
            live_nodes: 0,
            live_edges: 0,
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Number of node slots ever allocated (live or removed).  Sizes the
    /// per-node scratch arrays of the shortest-path oracle.
    pub fn node_slots(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live_nodes == 0
    }

    pub fn distance_source(&self) -> DistanceSource {
        self.distance_source
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Name of `id`, or `"?"` for a removed/unknown node (for log output).
    pub fn node_name(&self, id: NodeId) -> &str {
        self.node(id).map_or("?", |n| n.name.as_str())
    }

    /// Live node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Live edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges().map(|(id, _)| id).collect()
    }

    /// Edges incident to `node` (empty for unknown nodes).
    pub fn incident(&self, node: NodeId) -> &[EdgeId] {
        self.adjacency.get(node.index()).map_or(&[], Vec::as_slice)
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.incident(node).len()
    }

    /// The edge joining `a` and `b`, in either orientation.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.incident(a)
            .iter()
            .copied()
            .find(|&e| self.edge(e).is_some_and(|edge| edge.other(a) == b && edge.touches(b)))
    }

    /// The trial count shared by every edge, or `None` if any edge is
    /// unsampled or the counts disagree.
    pub fn trial_count(&self) -> Option<usize> {
        let mut count = None;
        for (_, edge) in self.edges() {
            let n = edge.trials.len();
            if n == 0 || count.is_some_and(|c| c != n) {
                return None;
            }
            count = Some(n);
        }
        count
    }

    /// `true` if every live node can reach every other live node.
    pub fn is_connected(&self) -> bool {
        unreachable_from_first(self).is_none()
    }

    // ── Materialization ───────────────────────────────────────────────────

    /// Copy trial `t` of every edge into its active sample.
    ///
    /// Edges with fewer than `t + 1` trials keep their current active sample.
    pub fn materialize(&mut self, t: usize) {
        for edge in self.edges.iter_mut().flatten() {
            if let Some(sample) = edge.trials.sample(t) {
                edge.active = sample;
            }
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add a node.  Fails without mutating on a duplicate name, duplicate
    /// position, or malformed attributes.
    pub fn insert_node(&mut self, name: &str, attrs: NodeAttrs) -> GraphResult<NodeId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GraphError::InvalidNodeAttributes {
                node:   name.to_owned(),
                reason: "name is empty".to_owned(),
            });
        }
        if self.names.contains_key(name) {
            return Err(GraphError::DuplicateNode(name.to_owned()));
        }
        if let Some(reason) = attrs.problem() {
            return Err(GraphError::InvalidNodeAttributes { node: name.to_owned(), reason });
        }
        if let Some(other) = self.nodes.iter().flatten().find(|n| n.attrs.pos == attrs.pos) {
            return Err(GraphError::DuplicatePosition {
                node:  name.to_owned(),
                other: other.name.clone(),
            });
        }

        let id = NodeId::try_from(self.nodes.len()).map_err(|_| GraphError::InvalidNodeAttributes {
            node:   name.to_owned(),
            reason: "node arena is full".to_owned(),
        })?;
        self.nodes.push(Some(Node { name: name.to_owned(), attrs }));
        self.adjacency.push(Vec::new());
        self.names.insert(name.to_owned(), id);
        self.live_nodes += 1;
        Ok(id)
    }

    /// Add an undirected edge between two live nodes.  Its static distance
    /// and elevation delta are derived from the endpoint attributes; its
    /// trial vectors start empty.
    pub fn insert_edge(&mut self, a: NodeId, b: NodeId, spec: EdgeSpec) -> GraphResult<EdgeId> {
        let node_a = self.node(a).ok_or(GraphError::NodeNotFound(a))?;
        let node_b = self.node(b).ok_or(GraphError::NodeNotFound(b))?;
        let (name_a, name_b) = (node_a.name.clone(), node_b.name.clone());

        if a == b {
            return Err(GraphError::SelfLoop { a: name_a, b: name_b });
        }
        if self.edge_between(a, b).is_some() {
            return Err(GraphError::DuplicateEdge { a: name_a, b: name_b });
        }
        if let Some(reason) = spec.problem() {
            return Err(GraphError::InvalidEdge { a: name_a, b: name_b, reason });
        }

        let distance = cost::edge_length(&node_a.attrs, &node_b.attrs, self.distance_source);
        let elevation_delta = node_b.attrs.elevation - node_a.attrs.elevation;

        let id = EdgeId::try_from(self.edges.len()).map_err(|_| GraphError::InvalidEdge {
            a:      name_a.clone(),
            b:      name_b.clone(),
            reason: "edge arena is full".to_owned(),
        })?;
        self.edges.push(Some(Edge {
            a,
            b,
            obstruction_probability: spec.obstruction_probability,
            time_samples: spec.time_samples,
            distance,
            elevation_delta,
            trials: TrialVectors::default(),
            active: EdgeSample::default(),
        }));
        self.adjacency[a.index()].push(id);
        self.adjacency[b.index()].push(id);
        self.live_edges += 1;
        Ok(id)
    }

    /// Remove `node` and every incident edge.  Returns the removed edge ids.
    pub fn remove_node(&mut self, node: NodeId) -> GraphResult<Vec<EdgeId>> {
        let removed = self
            .nodes
            .get_mut(node.index())
            .and_then(Option::take)
            .ok_or(GraphError::NodeNotFound(node))?;
        self.names.remove(&removed.name);
        self.live_nodes -= 1;

        let incident = std::mem::take(&mut self.adjacency[node.index()]);
        for &e in &incident {
            if let Some(edge) = self.edges[e.index()].take() {
                let other = edge.other(node);
                self.adjacency[other.index()].retain(|&x| x != e);
                self.live_edges -= 1;
            }
        }
        Ok(incident)
    }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Collect nodes and edges, then validate the whole shape in
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use mcr_network::{GraphBuilder, NodeAttrs};
///
/// let mut b = GraphBuilder::new();
/// let station = b.add_node("Station", NodeAttrs::at(10.0, 8.0));
/// let field   = b.add_node("Field",   NodeAttrs::at(8.0, 8.0));
/// b.add_road(station, field, vec![100.0, 140.0]);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub struct GraphBuilder {
    nodes: Vec<(String, NodeAttrs)>,
    edges: Vec<(usize, usize, EdgeSpec)>,
    distance_source: DistanceSource,
    default_obstruction: f64,
    check_lengths: bool,
    require_connected: bool,
}

/// Handle to a node added to a [`GraphBuilder`] (index in insertion order).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PendingNode(usize);

/// Edge lengths beyond this many sigma from the mean are logged.
const LENGTH_WARN_SIGMA: f64 = 1.5;
/// Edge lengths beyond this many sigma from the mean are rejected.
const LENGTH_REJECT_SIGMA: f64 = 3.0;

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            distance_source: DistanceSource::Plane,
            default_obstruction: 0.0,
            check_lengths: true,
            require_connected: false,
        }
    }

    pub fn distance_source(mut self, source: DistanceSource) -> Self {
        self.distance_source = source;
        self
    }

    /// Obstruction probability for edges added with [`add_road`](Self::add_road).
    pub fn default_obstruction(mut self, p: f64) -> Self {
        self.default_obstruction = p;
        self
    }

    /// Enable/disable the edge-length outlier check (on by default).
    pub fn check_edge_lengths(mut self, enabled: bool) -> Self {
        self.check_lengths = enabled;
        self
    }

    /// Reject graphs in which some node cannot reach another.
    pub fn require_connected(mut self, enabled: bool) -> Self {
        self.require_connected = enabled;
        self
    }

    pub fn add_node(&mut self, name: &str, attrs: NodeAttrs) -> PendingNode {
        self.nodes.push((name.to_owned(), attrs));
        PendingNode(self.nodes.len() - 1)
    }

    /// Add an edge with explicit obstruction probability and samples.
    pub fn add_edge(&mut self, a: PendingNode, b: PendingNode, spec: EdgeSpec) {
        self.edges.push((a.0, b.0, spec));
    }

    /// Add an edge using the builder's default obstruction probability.
    pub fn add_road(&mut self, a: PendingNode, b: PendingNode, time_samples: Vec<f64>) {
        let spec = EdgeSpec::new(self.default_obstruction, time_samples);
        self.add_edge(a, b, spec);
    }

    /// Validate and produce a [`Graph`].  `NodeId`s are assigned in
    /// insertion order, so `PendingNode(i)` becomes `NodeId(i)`.
    pub fn build(self) -> GraphResult<Graph> {
        let mut graph = Graph::new(self.distance_source);
        let mut ids = Vec::with_capacity(self.nodes.len());
        for (name, attrs) in self.nodes {
            ids.push(graph.insert_node(&name, attrs)?);
        }
        for (a, b, spec) in self.edges {
            let lookup = |i: usize| ids.get(i).copied().ok_or_else(|| GraphError::UnknownNode(format!("#{i}")));
            graph.insert_edge(lookup(a)?, lookup(b)?, spec)?;
        }

        if graph.node_count() > 1 {
            if let Some(lonely) = graph.node_ids().find(|&n| graph.degree(n) == 0) {
                return Err(GraphError::IsolatedNode(graph.node_name(lonely).to_owned()));
            }
        }
        if self.require_connected {
            if let Some(far) = unreachable_from_first(&graph) {
                let first = graph.node_ids().next().map_or("?", |n| graph.node_name(n));
                return Err(GraphError::Disconnected(graph.node_name(far).to_owned(), first.to_owned()));
            }
        }
        if self.check_lengths {
            check_edge_lengths(&graph)?;
        }
        Ok(graph)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// First live node (by id) that the lowest-id node cannot reach.
fn unreachable_from_first(graph: &Graph) -> Option<NodeId> {
    let start = graph.node_ids().next()?;
    let mut seen = vec![false; graph.node_slots()];
    let mut stack = vec![start];
    seen[start.index()] = true;
    while let Some(n) = stack.pop() {
        for &e in graph.incident(n) {
            if let Some(edge) = graph.edge(e) {
                let next = edge.other(n);
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    stack.push(next);
                }
            }
        }
    }
    graph.node_ids().find(|n| !seen[n.index()])
}

/// Flag edges whose length is far from the mean edge length: more than
/// 1.5σ logs a warning, more than 3σ is an error.
pub fn check_edge_lengths(graph: &Graph) -> GraphResult<()> {
    let lengths: Vec<f64> = graph.edges().map(|(_, e)| e.distance).collect();
    let (Some(mean), Some(sd)) = (
        mcr_core::stats::mean(&lengths),
        mcr_core::stats::sample_std_dev(&lengths),
    ) else {
        return Ok(());
    };

    for (_, edge) in graph.edges() {
        let z = (edge.distance - mean).abs();
        if z > LENGTH_REJECT_SIGMA * sd {
            return Err(GraphError::EdgeLengthOutlier {
                a:      graph.node_name(edge.a).to_owned(),
                b:      graph.node_name(edge.b).to_owned(),
                length: edge.distance,
                mean,
            });
        }
        if z > LENGTH_WARN_SIGMA * sd {
            tracing::warn!(
                a = graph.node_name(edge.a),
                b = graph.node_name(edge.b),
                length = edge.distance,
                mean,
                "edge length is more than {LENGTH_WARN_SIGMA} sigma from the mean",
            );
        }
    }
    Ok(())
}
