//! Stochastic edge-weight generator.
//!
//! For each edge and each of N trials the generator draws a travel time from
//! a normal distribution fitted to the edge's historical samples, derives the
//! fuel cost, flips an obstruction coin, and combines everything into one
//! composite weight.
//!
//! # Determinism
//!
//! Draws come from [`EdgeRng`], seeded from `(seed, edge_id)`.  Trial vectors
//! therefore depend only on the seed and the edge itself: sampling a newly
//! added edge never shifts the samples of the existing ones.
//!
//! # Atomicity
//!
//! All vectors are computed first and written to the graph only when every
//! edge succeeded.  An `Err` leaves the graph untouched.

use rand_distr::{Distribution, Normal};

use mcr_core::{EdgeId, EdgeRng, FuelModel, PathType, SimConfig, Weighting, stats};

use crate::cost;
use crate::graph::{Edge, Graph, TrialVectors};
use crate::{WeightError, WeightResult};

// ── Reports ───────────────────────────────────────────────────────────────────

/// A trial whose composite weight came out ≤ 0 and was clamped to the
/// minimum weight.  Logged, never an error.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NonPositiveWeight {
    pub edge:  EdgeId,
    pub trial: usize,
    /// The weight before clamping.
    pub raw:   f64,
}

/// Summary of one generation or reweighting pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightReport {
    /// Number of edges written.
    pub edges:    usize,
    pub trials:   usize,
    pub warnings: Vec<NonPositiveWeight>,
}

// ── WeightGenerator ───────────────────────────────────────────────────────────

/// Parameters of a generation pass.  Cheap to copy; holds no RNG state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WeightGenerator {
    pub trials:              usize,
    pub fuel_model:          FuelModel,
    pub weighting:           Weighting,
    pub time_scale:          f64,
    pub obstruction_penalty: f64,
    pub min_weight:          f64,
    pub seed:                u64,
}

impl WeightGenerator {
    /// Generator for the matrix of `path_type`.  [`PathType::AskUser`] has
    /// no weighting of its own and gets the quickest one.
    pub fn from_config(config: &SimConfig, path_type: PathType) -> Self {
        Self {
            trials:              config.trials,
            fuel_model:          config.fuel_model,
            weighting:           config.weighting(path_type).copied().unwrap_or(config.quickest),
            time_scale:          config.time_scale,
            obstruction_penalty: config.obstruction_penalty,
            min_weight:          config.min_weight,
            seed:                config.seed,
        }
    }

    /// The same generator with a different weighting.
    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Sample every edge of `graph`.
    pub fn generate(&self, graph: &mut Graph) -> WeightResult<WeightReport> {
        let ids = graph.edge_ids();
        self.generate_edges(graph, &ids)
    }

    /// Sample only `edges`, leaving every other edge's vectors as they are.
    pub fn generate_edges(&self, graph: &mut Graph, edges: &[EdgeId]) -> WeightResult<WeightReport> {
        if self.trials == 0 {
            return Err(WeightError::NoTrials);
        }

        let mut staged = Vec::with_capacity(edges.len());
        let mut warnings = Vec::new();
        for &id in edges {
            let edge = graph.edge(id).ok_or(WeightError::EdgeNotFound(id))?;
            let vectors = self.sample_edge(id, edge, &mut warnings)?;
            staged.push((id, vectors));
        }

        let written = staged.len();
        for (id, vectors) in staged {
            if let Some(edge) = graph.edge_mut(id) {
                if let Some(first) = vectors.sample(0) {
                    edge.active = first;
                }
                edge.trials = vectors;
            }
        }

        log_warnings(&warnings);
        tracing::debug!(edges = written, trials = self.trials, "edge weights generated");
        Ok(WeightReport { edges: written, trials: self.trials, warnings })
    }

    /// Recompute every edge's weight vector from its stored time, fuel, and
    /// obstruction vectors using this generator's weighting.  No new draws
    /// are made.  Trial 0 becomes the active sample.
    pub fn reweight(&self, graph: &mut Graph) -> WeightReport {
        let ids = graph.edge_ids();
        let mut warnings = Vec::new();
        let mut written = 0;
        for id in ids {
            let Some(edge) = graph.edge_mut(id) else { continue };
            let (distance, delta) = (edge.distance, edge.elevation_delta);
            let trials = &mut edge.trials;
            for t in 0..trials.time.len().min(trials.fuel.len()).min(trials.obstructed.len()) {
                let (w, clamped) = self.weight_of(trials.time[t], trials.fuel[t], distance, delta, trials.obstructed[t]);
                if let Some(raw) = clamped {
                    warnings.push(NonPositiveWeight { edge: id, trial: t, raw });
                }
                if let Some(slot) = trials.weight.get_mut(t) {
                    *slot = w;
                }
            }
            if let Some(first) = edge.trials.sample(0) {
                edge.active = first;
            }
            written += 1;
        }
        log_warnings(&warnings);
        WeightReport { edges: written, trials: self.trials, warnings }
    }

    /// `true` if the obstruction penalty exceeds the sum of every edge's
    /// largest unobstructed weight, so an obstructed edge can never beat any
    /// simple unobstructed route.  Logs a warning otherwise.
    pub fn check_penalty(&self, graph: &Graph) -> bool {
        let bound: f64 = graph
            .edges()
            .map(|(_, e)| {
                let t = &e.trials;
                t.time
                    .iter()
                    .zip(&t.fuel)
                    .map(|(&time, &fuel)| self.weight_of(time, fuel, e.distance, e.elevation_delta, false).0)
                    .fold(0.0, f64::max)
            })
            .sum();
        let dominates = self.obstruction_penalty > bound;
        if !dominates {
            tracing::warn!(
                penalty = self.obstruction_penalty,
                unobstructed_bound = bound,
                "obstruction penalty does not dominate unobstructed route weights",
            );
        }
        dominates
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn sample_edge(
        &self,
        id: EdgeId,
        edge: &Edge,
        warnings: &mut Vec<NonPositiveWeight>,
    ) -> WeightResult<TrialVectors> {
        let samples = &edge.time_samples;
        let (Some(mean), Some(sd)) = (stats::mean(samples), stats::sample_std_dev(samples)) else {
            return Err(WeightError::InsufficientSamples { edge: id, got: samples.len() });
        };
        let normal = Normal::new(mean, sd)
            .map_err(|e| WeightError::InvalidDistribution { edge: id, reason: e.to_string() })?;

        let mut rng = EdgeRng::new(self.seed, id);
        let n = self.trials;
        let mut out = TrialVectors {
            time:       Vec::with_capacity(n),
            fuel:       Vec::with_capacity(n),
            obstructed: Vec::with_capacity(n),
            weight:     Vec::with_capacity(n),
        };

        for t in 0..n {
            let time = normal.sample(rng.inner()).abs();
            let obstructed = rng.gen_bool(edge.obstruction_probability);
            let fuel = cost::fuel_cost(&self.fuel_model, time, edge.distance, edge.elevation_delta);
            let (weight, clamped) = self.weight_of(time, fuel, edge.distance, edge.elevation_delta, obstructed);
            if let Some(raw) = clamped {
                warnings.push(NonPositiveWeight { edge: id, trial: t, raw });
            }
            out.time.push(time);
            out.fuel.push(fuel);
            out.obstructed.push(obstructed);
            out.weight.push(weight);
        }
        Ok(out)
    }

    /// Final weight and, if it had to be clamped, the raw value.
    ///
    /// The unobstructed term is floored before the penalty is added, so an
    /// obstructed trial always weighs at least `obstruction_penalty`.  NaN
    /// counts as non-positive.
    fn weight_of(&self, time: f64, fuel: f64, distance: f64, delta: f64, obstructed: bool) -> (f64, Option<f64>) {
        let raw = cost::composite_weight(&self.weighting, self.time_scale, time, distance, delta, fuel);
        let (base, clamped) = if raw > 0.0 { (raw, None) } else { (self.min_weight, Some(raw)) };
        if obstructed { (base + self.obstruction_penalty, clamped) } else { (base, clamped) }
    }
}

fn log_warnings(warnings: &[NonPositiveWeight]) {
    for w in warnings {
        tracing::warn!(edge = %w.edge, trial = w.trial, raw = w.raw, "non-positive edge weight clamped");
    }
}
