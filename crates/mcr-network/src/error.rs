//! Network-subsystem error types.

use thiserror::Error;

use mcr_core::{EdgeId, NodeId};

/// Shape errors raised while building or editing a [`Graph`](crate::Graph).
///
/// Every mutating `Graph` method validates before it touches the arena, so
/// an `Err` always means the graph is unchanged.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid attributes for node {node:?}: {reason}")]
    InvalidNodeAttributes { node: String, reason: String },

    #[error("node {0:?} already exists")]
    DuplicateNode(String),

    #[error("nodes {node:?} and {other:?} share the same position")]
    DuplicatePosition { node: String, other: String },

    #[error("node {0:?} does not exist")]
    UnknownNode(String),

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("edge {a:?}-{b:?} connects a node to itself")]
    SelfLoop { a: String, b: String },

    #[error("edge {a:?}-{b:?} already exists")]
    DuplicateEdge { a: String, b: String },

    #[error("invalid edge {a:?}-{b:?}: {reason}")]
    InvalidEdge { a: String, b: String, reason: String },

    #[error("node {0:?} is not connected to any other node")]
    IsolatedNode(String),

    #[error("graph is not connected: {0:?} cannot be reached from {1:?}")]
    Disconnected(String, String),

    #[error("edge {a:?}-{b:?} length {length:.3} is more than 3 sigma from the mean {mean:.3}")]
    EdgeLengthOutlier { a: String, b: String, length: f64, mean: f64 },
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors from the stochastic edge-weight generator.
#[derive(Debug, Error)]
pub enum WeightError {
    #[error("edge {edge} has {got} historical time sample(s); at least 2 are required")]
    InsufficientSamples { edge: EdgeId, got: usize },

    #[error("edge {edge} samples cannot parameterise a normal distribution: {reason}")]
    InvalidDistribution { edge: EdgeId, reason: String },

    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeId),

    #[error("trial count must be at least 1")]
    NoTrials,
}

pub type WeightResult<T> = Result<T, WeightError>;

/// Errors from a shortest-path query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no path from {from} to {to}")]
    NoPathFound { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),
}

pub type RouteResult<T> = Result<T, RouteError>;
