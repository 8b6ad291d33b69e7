//! Decision inputs and outputs.

use mcr_core::{ClockTime, NodeId, PathType};
use mcr_matrix::PathMatrix;

use crate::{EmergencyDistribution, FrequencyTable};

/// Read-only snapshot handed to the decision procedure.
///
/// Borrowed from the simulation's state; building one allocates nothing.
#[derive(Clone, Copy, Debug)]
pub struct DecisionInput<'a> {
    pub current: NodeId,
    pub station: NodeId,
    pub fuel:    f64,
    pub clock:   ClockTime,

    /// `None` means no frequency data: the destination must come from a
    /// human.
    pub frequency:   Option<&'a FrequencyTable>,
    pub emergencies: Option<&'a EmergencyDistribution>,

    /// Travel time (seconds) of every completed operation.
    pub time_history: &'a [f64],
    /// Fuel consumed by every completed operation.
    pub fuel_history: &'a [f64],

    /// `true` until the first operation has completed.
    pub first_cycle: bool,

    pub fuel_capacity:   f64,
    pub refuel_per_hour: f64,
    pub max_wait_hours:  u32,

    /// Source of predicted station → destination travel times.
    pub quickest: &'a PathMatrix,
}

/// The next destination and how to get there.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub from:      NodeId,
    /// For [`PathType::AskUser`] this is the station, a placeholder the
    /// caller replaces with a manual choice.
    pub to:        NodeId,
    pub path_type: PathType,
    /// Fuel gained while parked at the station, already capped at capacity.
    pub fuel_to_add: f64,
    pub low_fuel:  bool,
    /// Events predicted inside the lookahead window (0 or 1 after waiting).
    pub events:    u32,
    /// Hours spent waiting at the station before the event.
    pub waited_hours: u32,
    /// Clock after any waiting.
    pub clock:     ClockTime,
}

impl Decision {
    /// `true` when the procedure could not choose a destination itself.
    #[inline]
    pub fn needs_user(&self) -> bool {
        self.path_type == PathType::AskUser
    }
}
