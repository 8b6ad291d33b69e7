//! `PathMatrix` and its entries.

use mcr_core::{NodeId, PathType};
use mcr_network::PathResult;

use crate::{MatrixError, MatrixResult};

#[cfg(not(feature = "fx-hash"))]
type PairMap<V> = std::collections::HashMap<(NodeId, NodeId), V>;
#[cfg(feature = "fx-hash")]
type PairMap<V> = rustc_hash::FxHashMap<(NodeId, NodeId), V>;

// ── PathMatrixEntry ───────────────────────────────────────────────────────────

/// Routing data for one ordered `(from, to)` pair.
///
/// `best` is the trial with the lowest composite weight; ties go to the
/// earliest trial.  `repeat_count` is the number of trials whose edge list
/// equals `best`'s (always ≥ 1).
#[derive(Clone, Debug, PartialEq)]
pub struct PathMatrixEntry {
    pub best:         PathResult,
    /// One result per trial, in trial order.
    pub trials:       Vec<PathResult>,
    pub best_trial:   usize,
    pub repeat_count: usize,
}

impl PathMatrixEntry {
    /// Reduce a pair's per-trial results.  `None` for an empty vector.
    pub fn from_trials(trials: Vec<PathResult>) -> Option<Self> {
        let mut best_trial = 0;
        for (t, r) in trials.iter().enumerate().skip(1) {
            if r.weight < trials[best_trial].weight {
                best_trial = t;
            }
        }
        let best = trials.get(best_trial)?.clone();
        let repeat_count = trials.iter().filter(|r| r.same_route(&best)).count();
        Some(Self { best, trials, best_trial, repeat_count })
    }

    /// Fraction of trials that produced the best route, in `(0, 1]`.
    #[inline]
    pub fn confidence(&self) -> f64 {
        if self.trials.is_empty() {
            return 0.0;
        }
        self.repeat_count as f64 / self.trials.len() as f64
    }
}

// ── PathMatrix ────────────────────────────────────────────────────────────────

/// Every ordered pair of live nodes mapped to a [`PathMatrixEntry`], plus
/// the trial count and path type the matrix was built with.
#[derive(Clone, Debug, PartialEq)]
pub struct PathMatrix {
    entries:   PairMap<PathMatrixEntry>,
    trials:    usize,
    path_type: PathType,
}

impl PathMatrix {
    pub fn new(trials: usize, path_type: PathType) -> Self {
        Self { entries: PairMap::default(), trials, path_type }
    }

    #[inline]
    pub fn trials(&self) -> usize {
        self.trials
    }

    #[inline]
    pub fn path_type(&self) -> PathType {
        self.path_type
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, from: NodeId, to: NodeId) -> Option<&PathMatrixEntry> {
        self.entries.get(&(from, to))
    }

    /// Like [`get`](Self::get), but a missing pair is an error.
    pub fn entry(&self, from: NodeId, to: NodeId) -> MatrixResult<&PathMatrixEntry> {
        self.get(from, to).ok_or(MatrixError::MissingEntry { from, to })
    }

    /// Best route for the pair.
    pub fn best(&self, from: NodeId, to: NodeId) -> MatrixResult<&PathResult> {
        self.entry(from, to).map(|e| &e.best)
    }

    pub fn contains(&self, from: NodeId, to: NodeId) -> bool {
        self.entries.contains_key(&(from, to))
    }

    /// All keyed pairs in ascending `(from, to)` order.
    pub fn pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Entries in ascending `(from, to)` order.
    pub fn iter(&self) -> impl Iterator<Item = ((NodeId, NodeId), &PathMatrixEntry)> + '_ {
        self.pairs().into_iter().filter_map(move |k| self.entries.get(&k).map(|e| (k, e)))
    }

    pub(crate) fn insert(&mut self, from: NodeId, to: NodeId, entry: PathMatrixEntry) {
        self.entries.insert((from, to), entry);
    }

    /// Remove every entry with `node` at either end.  Returns the removed
    /// pairs in ascending order.
    pub(crate) fn remove_node(&mut self, node: NodeId) -> Vec<(NodeId, NodeId)> {
        let mut removed: Vec<_> = self
            .entries
            .keys()
            .filter(|(a, b)| *a == node || *b == node)
            .copied()
            .collect();
        removed.sort_unstable();
        for k in &removed {
            self.entries.remove(k);
        }
        removed
    }

    /// Surviving pairs whose best route passes through `node`, ascending.
    pub(crate) fn routed_through(&self, node: NodeId) -> Vec<(NodeId, NodeId)> {
        let mut pairs: Vec<_> = self
            .entries
            .iter()
            .filter(|((a, b), e)| *a != node && *b != node && e.best.visits(node))
            .map(|(k, _)| *k)
            .collect();
        pairs.sort_unstable();
        pairs
    }
}
