//! Event likelihood inputs: hourly frequency table and per-node emergency
//! distribution.

use rand::distributions::{Distribution, WeightedIndex};

use mcr_core::{NodeId, SimRng};
use mcr_network::Graph;

use crate::{DecisionError, DecisionResult};

/// Allowed distance of an emergency distribution's sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

// ── FrequencyTable ────────────────────────────────────────────────────────────

/// Probability that an event occurs during each hour of the day.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyTable([f64; 24]);

impl FrequencyTable {
    pub fn new(hours: [f64; 24]) -> DecisionResult<Self> {
        for (hour, &value) in hours.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(DecisionError::InvalidFrequency { hour, value });
            }
        }
        Ok(Self(hours))
    }

    /// Build from a slice that must hold exactly 24 values.
    pub fn from_slice(hours: &[f64]) -> DecisionResult<Self> {
        let array: [f64; 24] = hours
            .try_into()
            .map_err(|_| DecisionError::FrequencyTableLength(hours.len()))?;
        Self::new(array)
    }

    /// Event probability for `hour` (taken modulo 24).
    #[inline]
    pub fn probability(&self, hour: usize) -> f64 {
        self.0[hour % 24]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

// ── EmergencyDistribution ─────────────────────────────────────────────────────

/// Where the next emergency happens, given that one happens.
///
/// Probabilities are validated at construction to lie in `[0, 1]` and sum
/// to 1 within [`PROBABILITY_TOLERANCE`].
#[derive(Clone, Debug)]
pub struct EmergencyDistribution {
    nodes:   Vec<NodeId>,
    weights: Vec<f64>,
    index:   WeightedIndex<f64>,
}

impl EmergencyDistribution {
    pub fn new(entries: Vec<(NodeId, f64)>) -> DecisionResult<Self> {
        if entries.is_empty() {
            return Err(DecisionError::EmptyDistribution);
        }
        for &(node, value) in &entries {
            if !(0.0..=1.0).contains(&value) {
                return Err(DecisionError::InvalidProbability { node, value });
            }
        }
        let sum: f64 = entries.iter().map(|(_, p)| p).sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(DecisionError::ProbabilitiesDoNotSumToOne { sum });
        }
        let (nodes, weights): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights)
            .map_err(|_| DecisionError::ProbabilitiesDoNotSumToOne { sum })?;
        Ok(Self { nodes, weights, index })
    }

    /// Collect the `emergency_probability` attribute of every node that
    /// carries one.
    pub fn from_graph(graph: &Graph) -> DecisionResult<Self> {
        let entries = graph
            .node_ids()
            .filter_map(|id| {
                let p = graph.node(id)?.attrs.emergency_probability?;
                Some((id, p))
            })
            .collect();
        Self::new(entries)
    }

    /// The same distribution with `node` dropped and the remainder
    /// renormalized to sum to 1.
    pub fn without(&self, node: NodeId) -> DecisionResult<Self> {
        let rest: Vec<(NodeId, f64)> = self
            .nodes
            .iter()
            .zip(&self.weights)
            .filter(|(n, _)| **n != node)
            .map(|(&n, &p)| (n, p))
            .collect();
        let total: f64 = rest.iter().map(|(_, p)| p).sum();
        if rest.is_empty() || total <= 0.0 {
            return Err(DecisionError::EmptyDistribution);
        }
        Self::new(rest.into_iter().map(|(n, p)| (n, p / total)).collect())
    }

    /// Draw a destination.
    pub fn sample(&self, rng: &mut SimRng) -> NodeId {
        self.nodes[self.index.sample(rng.inner())]
    }

    pub fn probability(&self, node: NodeId) -> f64 {
        self.nodes
            .iter()
            .position(|&n| n == node)
            .map_or(0.0, |i| self.weights[i])
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}
