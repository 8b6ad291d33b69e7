//! Deterministic per-edge and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each edge draws its trial samples from its own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (edge_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive edge IDs uniformly across the seed space.
//! This means:
//!
//! - Edges never share RNG state, so trial vectors do not depend on the
//!   order in which edges are sampled (or on which worker samples them).
//! - Adding edges later (`add_node`) does not disturb the samples of
//!   existing edges; the same seed reproduces the same matrix.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::EdgeId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── EdgeRng ───────────────────────────────────────────────────────────────────

/// Per-edge deterministic RNG used by the weight generator.
pub struct EdgeRng(SmallRng);

impl EdgeRng {
    /// Seed deterministically from the run's global seed and an edge ID.
    pub fn new(global_seed: u64, edge: EdgeId) -> Self {
        let seed = global_seed ^ (edge.0 as u64).wrapping_mul(MIXING_CONSTANT);
        EdgeRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand_distr` distributions
    /// (`Normal::sample(rng.inner())`, …).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for the decision procedure and on-scene response
/// times.
///
/// Used only by the sequential simulation loop.
#[derive(Clone)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
