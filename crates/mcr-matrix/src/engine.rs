//! Matrix engine: full builds and incremental node insertion/removal.

use mcr_core::{NodeId, PathType};
use mcr_network::{EdgeSpec, Graph, GraphError, NodeAttrs, NonPositiveWeight, PathResult,
                  ShortestPathOracle, WeightGenerator};

use crate::{MatrixError, MatrixResult, PathMatrix, PathMatrixEntry};

type Pair = (NodeId, NodeId);

// ── Inputs & reports ──────────────────────────────────────────────────────────

/// A node to insert together with the edges joining it to existing nodes.
#[derive(Clone, Debug)]
pub struct NewNode {
    pub name:  String,
    pub attrs: NodeAttrs,
    /// `(existing neighbour, edge description)` pairs.
    pub edges: Vec<(NodeId, EdgeSpec)>,
}

impl NewNode {
    pub fn new(name: impl Into<String>, attrs: NodeAttrs) -> Self {
        Self { name: name.into(), attrs, edges: Vec::new() }
    }

    pub fn with_edge(mut self, neighbour: NodeId, spec: EdgeSpec) -> Self {
        self.edges.push((neighbour, spec));
        self
    }
}

/// What an incremental update changed.  All pair lists are ascending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatrixUpdate {
    /// The node inserted or removed.
    pub node:       NodeId,
    pub removed:    Vec<Pair>,
    pub recomputed: Vec<Pair>,
    pub added:      Vec<Pair>,
    /// Clamped weights on newly sampled edges.
    pub warnings:   Vec<NonPositiveWeight>,
}

// ── MatrixEngine ──────────────────────────────────────────────────────────────

/// Monte Carlo all-pairs routing over a pluggable oracle.
///
/// # Type parameter
///
/// `O` must implement [`ShortestPathOracle`] (e.g.
/// [`mcr_network::DijkstraOracle`]).  Swap it at compile time for a
/// different search with no runtime overhead.
pub struct MatrixEngine<O: ShortestPathOracle> {
    pub oracle: O,
}

impl<O: ShortestPathOracle> MatrixEngine<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Build the full matrix for every ordered pair of live nodes, `(i, i)`
    /// included, over every sampled trial.
    ///
    /// Trials are materialized into a private clone of `graph`; the caller's
    /// graph is never touched.  The first unreachable pair fails the whole
    /// build.
    pub fn build(&self, graph: &Graph, path_type: PathType) -> MatrixResult<PathMatrix> {
        if !path_type.is_buildable() {
            return Err(MatrixError::NotBuildable(path_type));
        }
        let trials = graph.trial_count().ok_or(MatrixError::NotSampled)?;
        let nodes: Vec<NodeId> = graph.node_ids().collect();
        let pairs: Vec<Pair> = nodes
            .iter()
            .flat_map(|&a| nodes.iter().map(move |&b| (a, b)))
            .collect();

        tracing::debug!(nodes = nodes.len(), pairs = pairs.len(), trials, %path_type, "building path matrix");
        let entries = self.compute(graph, &pairs, trials)?;

        let mut matrix = PathMatrix::new(trials, path_type);
        for ((a, b), entry) in pairs.into_iter().zip(entries) {
            matrix.insert(a, b, entry);
        }
        tracing::info!(entries = matrix.len(), trials, %path_type, "path matrix built");
        Ok(matrix)
    }

    /// Remove `node` and its edges from `graph`, drop every entry keyed on
    /// it, and recompute the surviving entries whose best route went through
    /// it.  Entries that never touched the node are left exactly as they
    /// were.
    ///
    /// Work is done on a staged copy of the graph; on `Err` neither `graph`
    /// nor `matrix` has changed.
    pub fn remove_node(
        &self,
        graph:  &mut Graph,
        matrix: &mut PathMatrix,
        node:   NodeId,
    ) -> MatrixResult<MatrixUpdate> {
        let trials = self.check_trials(graph, matrix)?;

        let mut staged = graph.clone();
        staged.remove_node(node)?;

        let recomputed = matrix.routed_through(node);
        let entries = self.compute(&staged, &recomputed, trials)?;

        // Commit.
        let name = graph.node_name(node).to_owned();
        *graph = staged;
        let removed = matrix.remove_node(node);
        for (&(a, b), entry) in recomputed.iter().zip(entries) {
            matrix.insert(a, b, entry);
        }

        tracing::info!(
            node = %name,
            removed = removed.len(),
            recomputed = recomputed.len(),
            path_type = %matrix.path_type(),
            "node removed from path matrix",
        );
        Ok(MatrixUpdate { node, removed, recomputed, added: Vec::new(), warnings: Vec::new() })
    }

    /// Insert `new` into `graph`, sample weights for its edges only, and add
    /// the `(new, k)`, `(k, new)` and `(new, new)` entries.  Existing
    /// entries are not touched.
    ///
    /// `generator` must use the same trial count and weighting the matrix
    /// was built with.  On `Err` neither `graph` nor `matrix` has changed.
    pub fn add_node(
        &self,
        graph:     &mut Graph,
        matrix:    &mut PathMatrix,
        new:       NewNode,
        generator: &WeightGenerator,
    ) -> MatrixResult<MatrixUpdate> {
        let trials = self.check_trials(graph, matrix)?;
        if generator.trials != trials {
            return Err(MatrixError::TrialMismatch { matrix: trials, other: generator.trials });
        }
        if new.edges.is_empty() && !graph.is_empty() {
            return Err(GraphError::IsolatedNode(new.name).into());
        }

        let mut staged = graph.clone();
        let id = staged.insert_node(&new.name, new.attrs)?;
        let mut new_edges = Vec::with_capacity(new.edges.len());
        for (peer, spec) in new.edges {
            new_edges.push(staged.insert_edge(id, peer, spec)?);
        }
        let report = generator.generate_edges(&mut staged, &new_edges)?;

        let mut added: Vec<Pair> = Vec::new();
        for k in staged.node_ids() {
            added.push((id, k));
            if k != id {
                added.push((k, id));
            }
        }
        added.sort_unstable();
        let entries = self.compute(&staged, &added, trials)?;

        // Commit.
        *graph = staged;
        for (&(a, b), entry) in added.iter().zip(entries) {
            matrix.insert(a, b, entry);
        }

        tracing::info!(
            node = %new.name,
            edges = new_edges.len(),
            added = added.len(),
            path_type = %matrix.path_type(),
            "node added to path matrix",
        );
        Ok(MatrixUpdate {
            node: id,
            removed: Vec::new(),
            recomputed: Vec::new(),
            added,
            warnings: report.warnings,
        })
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// The matrix trial count, provided the graph agrees with it.  An
    /// edgeless graph has nothing to disagree with.
    fn check_trials(&self, graph: &Graph, matrix: &PathMatrix) -> MatrixResult<usize> {
        let trials = matrix.trials();
        if graph.edge_count() > 0 {
            let sampled = graph.trial_count().ok_or(MatrixError::NotSampled)?;
            if sampled != trials {
                return Err(MatrixError::TrialMismatch { matrix: trials, other: sampled });
            }
        }
        Ok(trials)
    }

    /// One entry per pair, in `pairs` order.
    fn compute(&self, graph: &Graph, pairs: &[Pair], trials: usize) -> MatrixResult<Vec<PathMatrixEntry>> {
        let per_trial = self.run_trials(graph, pairs, trials)?;

        // Transpose trial-major results into pair-major vectors.
        let mut per_pair: Vec<Vec<PathResult>> =
            (0..pairs.len()).map(|_| Vec::with_capacity(trials)).collect();
        for results in per_trial {
            for (slot, r) in per_pair.iter_mut().zip(results) {
                slot.push(r);
            }
        }

        pairs
            .iter()
            .zip(per_pair)
            .map(|(&(from, to), results)| {
                PathMatrixEntry::from_trials(results).ok_or(MatrixError::MissingEntry { from, to })
            })
            .collect()
    }

    /// `result[t][i]` is the oracle's answer for `pairs[i]` under trial `t`.
    #[cfg(not(feature = "parallel"))]
    fn run_trials(&self, graph: &Graph, pairs: &[Pair], trials: usize) -> MatrixResult<Vec<Vec<PathResult>>> {
        let mut scratch = graph.clone();
        (0..trials)
            .map(|t| {
                scratch.materialize(t);
                self.route_all(&scratch, pairs)
            })
            .collect()
    }

    /// `result[t][i]` is the oracle's answer for `pairs[i]` under trial `t`.
    #[cfg(feature = "parallel")]
    fn run_trials(&self, graph: &Graph, pairs: &[Pair], trials: usize) -> MatrixResult<Vec<Vec<PathResult>>> {
        use rayon::prelude::*;

        (0..trials)
            .into_par_iter()
            .map_init(
                || graph.clone(),
                |scratch, t| {
                    scratch.materialize(t);
                    self.route_all(scratch, pairs)
                },
            )
            .collect()
    }

    fn route_all(&self, scratch: &Graph, pairs: &[Pair]) -> MatrixResult<Vec<PathResult>> {
        pairs
            .iter()
            .map(|&(from, to)| {
                self.oracle
                    .shortest_path(scratch, from, to)
                    .map_err(|source| MatrixError::MatrixBuildFailed { from, to, source })
            })
            .collect()
    }
}
