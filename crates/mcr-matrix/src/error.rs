use mcr_core::{NodeId, PathType};
use mcr_network::{GraphError, RouteError, WeightError};
use thiserror::Error;

/// Errors from building or updating a [`PathMatrix`](crate::PathMatrix).
///
/// A failed call never leaves a half-updated matrix or graph behind.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("matrix build failed for {from} -> {to}: {source}")]
    MatrixBuildFailed {
        from: NodeId,
        to:   NodeId,
        #[source]
        source: RouteError,
    },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("weight generation failed: {0}")]
    Weights(#[from] WeightError),

    #[error("graph edges have no sampled trials (or disagree on the trial count)")]
    NotSampled,

    #[error("matrix has {matrix} trials but the graph or generator has {other}")]
    TrialMismatch { matrix: usize, other: usize },

    #[error("no matrix entry for {from} -> {to}")]
    MissingEntry { from: NodeId, to: NodeId },

    #[error("no matrix can be built for path type {0}")]
    NotBuildable(PathType),
}

pub type MatrixResult<T> = Result<T, MatrixError>;
