//! Simulation observer trait for progress reporting and data collection.

use mcr_decision::Decision;
use mcr_network::Graph;

use crate::OperationReport;

/// Callbacks invoked by [`Sim::run_operation`][crate::Sim::run_operation]
/// and [`Sim::run`][crate::Sim::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: trip logger
///
/// ```rust,ignore
/// struct TripLogger;
///
/// impl SimObserver for TripLogger {
///     fn on_operation(&mut self, report: &OperationReport, graph: &Graph) {
///         println!("{} -> {}", graph.node_name(report.from), graph.node_name(report.to));
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called after the vehicle reaches its destination and finishes on
    /// scene.  `graph` resolves node names.
    fn on_operation(&mut self, _report: &OperationReport, _graph: &Graph) {}

    /// Called once the next destination has been decided.
    fn on_decision(&mut self, _decision: &Decision) {}

    /// Called once after [`Sim::run`][crate::Sim::run] completes every
    /// requested operation.
    fn on_sim_end(&mut self, _operations: usize) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
