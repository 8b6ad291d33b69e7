//! Per-operation report handed to observers.

use mcr_core::{ClockTime, NodeId, PathType};
use mcr_network::PathResult;

/// One completed operation: where the vehicle went, by which route, and
/// what it cost.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationReport {
    /// Zero-based operation counter.
    pub index:     usize,
    pub from:      NodeId,
    pub to:        NodeId,
    /// Matrix the route was read from.  Never `AskUser`.
    pub path_type: PathType,
    /// `true` when the destination came from the caller, not the model.
    pub manual:    bool,
    pub low_fuel:  bool,

    /// Best route across all trials.
    pub route:      PathResult,
    /// Share of trials whose best route equals `route`.
    pub confidence: f64,

    /// Hours spent parked before departure.
    pub waited_hours:     u32,
    pub fuel_added:       f64,
    pub fuel_used:        f64,
    pub fuel_remaining:   f64,
    /// On-scene response time, minutes.
    pub response_minutes: f64,
    /// Clock at departure, after any waiting.
    pub departed:         ClockTime,
    /// Clock after travel and response.
    pub finished:         ClockTime,
}
