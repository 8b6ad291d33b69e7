//! `mcr-decision`: predicts the vehicle's next destination and which path
//! matrix to route it with.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`frequency`] | `FrequencyTable` (24 hourly probabilities), `EmergencyDistribution` |
//! | [`input`]     | `DecisionInput<'a>` snapshot, `Decision` output           |
//! | [`procedure`] | `decide_destination`, fuel/time thresholds, lookahead     |
//! | [`model`]     | `DecisionModel` trait, `ProbabilisticModel`               |
//! | [`error`]     | `DecisionError`, `DecisionResult<T>`                      |

pub mod error;
pub mod frequency;
pub mod input;
pub mod model;
pub mod procedure;


pub use error::{DecisionError, DecisionResult};
pub use frequency::{EmergencyDistribution, FrequencyTable};
pub use input::{Decision, DecisionInput};
pub use model::{DecisionModel, ProbabilisticModel};
pub use procedure::{decide_destination, fuel_threshold, lookahead_hours, time_threshold};
