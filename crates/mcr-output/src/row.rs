//! Plain data row types written by output backends.
//!
//! Rows carry node names rather than ids so files read on their own.

use mcr_core::{NodeId, PathType};
use mcr_matrix::{PathMatrix, PathMatrixEntry};
use mcr_network::{Graph, PathResult};
use mcr_sim::OperationReport;

/// Separator between node names in a rendered route.
pub const ROUTE_SEPARATOR: &str = " > ";

/// One `(from, to)` entry of a path matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrixRow {
    pub path_type:       PathType,
    pub from:            String,
    pub to:              String,
    pub weight:          f64,
    pub total_time:      f64,
    pub total_distance:  f64,
    pub total_elevation: f64,
    pub total_fuel:      f64,
    /// Trials whose best route matched the overall best.
    pub repeat_count:    usize,
    pub trials:          usize,
    pub confidence:      f64,
    pub route:           String,
}

impl PathMatrixRow {
    pub fn new(graph: &Graph, path_type: PathType, from: NodeId, to: NodeId, entry: &PathMatrixEntry) -> Self {
        let best = &entry.best;
        Self {
            path_type,
            from:            graph.node_name(from).to_owned(),
            to:              graph.node_name(to).to_owned(),
            weight:          best.weight,
            total_time:      best.total_time,
            total_distance:  best.total_distance,
            total_elevation: best.total_elevation,
            total_fuel:      best.total_fuel,
            repeat_count:    entry.repeat_count,
            trials:          entry.trials.len(),
            confidence:      entry.confidence(),
            route:           render_route(graph, best),
        }
    }
}

/// Every entry of `matrix`, in ascending `(from, to)` id order.
pub fn matrix_rows(graph: &Graph, matrix: &PathMatrix) -> Vec<PathMatrixRow> {
    matrix
        .pairs()
        .into_iter()
        .filter_map(|(a, b)| {
            let entry = matrix.get(a, b)?;
            Some(PathMatrixRow::new(graph, matrix.path_type(), a, b, entry))
        })
        .collect()
}

/// One completed vehicle operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRow {
    pub index:            usize,
    pub from:             String,
    pub to:               String,
    pub path_type:        PathType,
    pub manual:           bool,
    pub low_fuel:         bool,
    pub waited_hours:     u32,
    /// Departure day and `HH:MM` clock.
    pub departed_day:     u32,
    pub departed:         String,
    pub finished_day:     u32,
    pub finished:         String,
    pub travel_time:      f64,
    pub distance:         f64,
    pub fuel_added:       f64,
    pub fuel_used:        f64,
    pub fuel_remaining:   f64,
    pub response_minutes: f64,
    pub confidence:       f64,
    pub route:            String,
}

impl OperationRow {
    pub fn new(graph: &Graph, report: &OperationReport) -> Self {
        Self {
            index:            report.index,
            from:             graph.node_name(report.from).to_owned(),
            to:               graph.node_name(report.to).to_owned(),
            path_type:        report.path_type,
            manual:           report.manual,
            low_fuel:         report.low_fuel,
            waited_hours:     report.waited_hours,
            departed_day:     report.departed.day,
            departed:         report.departed.to_string(),
            finished_day:     report.finished.day,
            finished:         report.finished.to_string(),
            travel_time:      report.route.total_time,
            distance:         report.route.total_distance,
            fuel_added:       report.fuel_added,
            fuel_used:        report.fuel_used,
            fuel_remaining:   report.fuel_remaining,
            response_minutes: report.response_minutes,
            confidence:       report.confidence,
            route:            render_route(graph, &report.route),
        }
    }
}

/// Node names along `path`, e.g. `Station > Field > Arena`.
pub fn render_route(graph: &Graph, path: &PathResult) -> String {
    path.nodes
        .iter()
        .map(|&n| graph.node_name(n))
        .collect::<Vec<_>>()
        .join(ROUTE_SEPARATOR)
}
