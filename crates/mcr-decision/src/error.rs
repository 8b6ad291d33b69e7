use mcr_core::NodeId;
use mcr_matrix::MatrixError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("frequency table must hold 24 hourly probabilities, got {0}")]
    FrequencyTableLength(usize),

    #[error("hour {hour} frequency {value} is outside [0, 1]")]
    InvalidFrequency { hour: usize, value: f64 },

    #[error("emergency distribution is empty")]
    EmptyDistribution,

    #[error("emergency probability {value} for node {node} is outside [0, 1]")]
    InvalidProbability { node: NodeId, value: f64 },

    #[error("emergency probabilities sum to {sum}, expected 1")]
    ProbabilitiesDoNotSumToOne { sum: f64 },

    #[error("an event was predicted but no emergency distribution is available")]
    MissingEmergencyDistribution,

    #[error("path lookup failed: {0}")]
    Matrix(#[from] MatrixError),
}

pub type DecisionResult<T> = Result<T, DecisionError>;
