//! The `DecisionModel` trait: the pluggable seam between the simulation
//! loop and the decision procedure.

use mcr_core::SimRng;

use crate::{Decision, DecisionInput, DecisionResult, decide_destination};

/// Chooses where the vehicle goes next.
///
/// The simulation owns the RNG and passes it in, so a model holds no
/// mutable state and replays identically from the same seed.
pub trait DecisionModel: Send + Sync + 'static {
    fn decide(&self, input: &DecisionInput<'_>, rng: &mut SimRng) -> DecisionResult<Decision>;
}

/// The default model: frequency-driven event prediction with fuel and
/// travel-time thresholds (see [`decide_destination`]).
#[derive(Copy, Clone, Debug, Default)]
pub struct ProbabilisticModel;

impl DecisionModel for ProbabilisticModel {
    fn decide(&self, input: &DecisionInput<'_>, rng: &mut SimRng) -> DecisionResult<Decision> {
        decide_destination(input, rng)
    }
}
