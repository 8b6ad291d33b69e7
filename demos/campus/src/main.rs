//! campus: a single response vehicle serving a seven-location campus.
//!
//! Builds both path matrices, runs a day of operations driven by an hourly
//! call-frequency table, then closes Milican Hall, opens a Teaching Academy,
//! and keeps going.  Results land in `output/campus/`.
//!
//! Set `MCR_LOG=debug` for matrix-build progress.

mod network;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use mcr_core::{PathType, SimConfig};
use mcr_decision::{Decision, FrequencyTable, ProbabilisticModel};
use mcr_matrix::NewNode;
use mcr_network::{DijkstraOracle, EdgeSpec, Graph, NodeAttrs};
use mcr_output::{CsvWriter, OutputWriter, SimOutputObserver, render_route};
use mcr_sim::{OperationReport, SimBuilder, SimError, SimObserver};

use network::{build_campus, node};

// ── Constants ─────────────────────────────────────────────────────────────────

const OPERATIONS_BEFORE: usize = 8;
const OPERATIONS_AFTER:  usize = 8;
const OUTPUT_DIR:        &str  = "output/campus";

const CONFIG_TOML: &str = r#"
trials                  = 100
seed                    = 42
obstruction_probability = 0.1
fuel_capacity           = 120.0
fuel_start              = 120.0
refuel_per_hour         = 20.0
start_minute            = 720.0
station                 = "Station"
path_type               = "quickest"
max_wait_hours          = 72
response_mean_min       = 8.0
response_std_min        = 1.5

[fuel_model]
base         = 0.0
per_second   = 0.002
per_distance = 0.01
per_climb    = 0.05
"#;

/// Chance of a call during each hour of the day.  Quiet overnight, busiest
/// mid-afternoon.
const FREQUENCY: [f64; 24] = [
    0.05, 0.04, 0.03, 0.03, 0.03, 0.04, 0.08, 0.15,
    0.25, 0.30, 0.35, 0.40, 0.45, 0.50, 0.55, 0.50,
    0.45, 0.40, 0.35, 0.30, 0.20, 0.15, 0.10, 0.07,
];

// ── Observer wrapper to keep a trip log ───────────────────────────────────────

// Runs happen in two batches, so the writer is finished by hand at the end
// rather than from `on_sim_end`.

struct TripLog<W: OutputWriter> {
    inner: SimOutputObserver<W>,
    lines: Vec<String>,
}

impl<W: OutputWriter> TripLog<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, lines: Vec::new() }
    }
}

impl<W: OutputWriter> SimObserver for TripLog<W> {
    fn on_operation(&mut self, report: &OperationReport, graph: &Graph) {
        self.lines.push(format!(
            "{:>3}  {:<5} {:<15} {:>7.1}s  {:>6.2}  {:>5.0}%  {}",
            report.index,
            report.finished.to_string(),
            report.path_type.as_str(),
            report.route.total_time,
            report.fuel_remaining,
            report.confidence * 100.0,
            render_route(graph, &report.route),
        ));
        self.inner.on_operation(report, graph);
    }

    fn on_decision(&mut self, decision: &Decision) {
        self.inner.on_decision(decision);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("MCR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // 1. Configuration and graph.
    let config = SimConfig::from_toml_str(CONFIG_TOML)?;
    let graph = build_campus(config.obstruction_probability)?;
    println!("=== campus: Monte Carlo vehicle router ===");
    println!(
        "Graph: {} nodes, {} edges  |  Trials: {}  |  Seed: {}",
        graph.node_count(),
        graph.edge_count(),
        config.trials,
        config.seed,
    );

    // 2. Build both matrices.
    let t0 = Instant::now();
    let mut sim = SimBuilder::new(graph, config, ProbabilisticModel, DijkstraOracle)
        .frequency(FrequencyTable::new(FREQUENCY)?)
        .build()?;
    println!("Matrices built in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    let station = sim.station();
    let milican = node(sim.graph(), "Milican Hall")?;
    for path_type in [PathType::Quickest, PathType::FuelEfficient] {
        let Some(matrix) = sim.matrix(path_type) else { continue };
        let entry = matrix.entry(station, milican)?;
        println!(
            "Station -> Milican Hall ({path_type}): {}  [{:.1}s, fuel {:.2}, confidence {:.0}%]",
            render_route(sim.graph(), &entry.best),
            entry.best.total_time,
            entry.best.total_fuel,
            entry.confidence() * 100.0,
        );
    }
    println!();

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let mut obs = TripLog::new(SimOutputObserver::new(CsvWriter::new(Path::new(OUTPUT_DIR))?));
    obs.inner.write_matrix(sim.graph(), sim.quickest())?;
    obs.inner.write_matrix(sim.graph(), sim.fuel_efficient())?;

    // 4. Operate.
    sim.run(OPERATIONS_BEFORE, &mut obs)?;

    // 5. Close Milican Hall unless the vehicle is standing in it.
    match sim.remove_node(milican) {
        Ok(update) => println!(
            "Removed Milican Hall: {} entries dropped, {} recomputed",
            update.removed.len(),
            update.recomputed.len(),
        ),
        Err(SimError::ProtectedNode(name)) => println!("Kept {name}: the vehicle is there"),
        Err(e) => return Err(e.into()),
    }

    // 6. Open the Teaching Academy.
    let lake = node(sim.graph(), "Lake Claire")?;
    let child = node(sim.graph(), "Child Center")?;
    let academy = NewNode::new("Teaching Academy", NodeAttrs::at(4.0, 4.0).with_elevation(-5.0))
        .with_edge(lake, EdgeSpec::new(0.1, vec![100.0, 200.0]))
        .with_edge(child, EdgeSpec::new(0.1, vec![100.0, 200.0]));
    let update = sim.add_node(academy)?;
    println!("Added Teaching Academy: {} entries", update.added.len());
    println!();

    sim.run(OPERATIONS_AFTER, &mut obs)?;

    obs.inner.finish()?;
    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 7. Trip log.
    println!("{:>3}  {:<5} {:<15} {:>8}  {:>6}  {:>6}  Route", "#", "Done", "Path", "Travel", "Fuel", "Conf");
    println!("{}", "-".repeat(80));
    for line in &obs.lines {
        println!("{line}");
    }
    println!();
    println!(
        "{} operations written to {OUTPUT_DIR}/operations.csv",
        obs.inner.written(),
    );

    Ok(())
}
