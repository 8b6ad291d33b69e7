use mcr_core::{CoreError, NodeId};
use mcr_decision::DecisionError;
use mcr_matrix::MatrixError;
use mcr_network::{GraphError, WeightError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Weights(#[from] WeightError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error("station {0:?} is not a node of the graph")]
    UnknownStation(String),

    #[error("node {0} is not in the graph")]
    UnknownNode(NodeId),

    #[error("no frequency data: a destination must be supplied for this operation")]
    DestinationRequired,

    #[error("node {0:?} cannot be removed while it is the station or the vehicle's location")]
    ProtectedNode(String),

    #[error("response time distribution: {0}")]
    ResponseTime(String),
}

pub type SimResult<T> = Result<T, SimError>;
