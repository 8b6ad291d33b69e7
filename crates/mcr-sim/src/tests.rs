//! Integration tests for mcr-sim.

use mcr_core::{NodeId, PathType, SimConfig};
use mcr_decision::{Decision, EmergencyDistribution, FrequencyTable, ProbabilisticModel};
use mcr_network::{DijkstraOracle, Graph, GraphBuilder, NodeAttrs};

use crate::{OperationReport, Sim, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

type CampusSim = Sim<ProbabilisticModel, DijkstraOracle>;

/// Station ── Field ── Arena ── Child, with Softball and Lake hanging off.
fn campus() -> Graph {
    let mut b = GraphBuilder::new().default_obstruction(0.1);
    let station  = b.add_node("Station",  NodeAttrs::at(10.0, 8.0));
    let field    = b.add_node("Field",    NodeAttrs::at(8.0, 8.0));
    let softball = b.add_node("Softball", NodeAttrs::at(10.0, 6.0));
    let arena    = b.add_node("Arena",    NodeAttrs::at(8.0, 6.0).with_elevation(1.0));
    let lake     = b.add_node("Lake",     NodeAttrs::at(6.0, 6.0));
    let child    = b.add_node("Child",    NodeAttrs::at(8.0, 4.0));
    b.add_road(station, field, vec![100.0, 120.0, 140.0]);
    b.add_road(station, softball, vec![90.0, 130.0]);
    b.add_road(field, arena, vec![60.0, 80.0]);
    b.add_road(softball, arena, vec![70.0, 75.0, 90.0]);
    b.add_road(arena, lake, vec![100.0, 200.0]);
    b.add_road(arena, child, vec![50.0, 55.0]);
    b.build().unwrap()
}

fn config() -> SimConfig {
    SimConfig { trials: 5, max_wait_hours: 5, ..SimConfig::default() }
}

fn id(g: &Graph, name: &str) -> NodeId {
    g.node_id(name).unwrap()
}

fn builder(config: SimConfig) -> SimBuilder<ProbabilisticModel, DijkstraOracle> {
    SimBuilder::new(campus(), config, ProbabilisticModel, DijkstraOracle)
}

/// Events every hour, split evenly between Child and Lake.
fn busy(config: SimConfig) -> CampusSim {
    let g = campus();
    let dist = EmergencyDistribution::new(vec![(id(&g, "Child"), 0.5), (id(&g, "Lake"), 0.5)]).unwrap();
    SimBuilder::new(g, config, ProbabilisticModel, DijkstraOracle)
        .frequency(FrequencyTable::new([1.0; 24]).unwrap())
        .emergencies(dist)
        .build()
        .unwrap()
}

#[derive(Default)]
struct Recorder {
    operations: Vec<OperationReport>,
    decisions:  Vec<Decision>,
    ended:      Option<usize>,
}

impl SimObserver for Recorder {
    fn on_operation(&mut self, report: &OperationReport, _graph: &Graph) {
        self.operations.push(report.clone());
    }

    fn on_decision(&mut self, decision: &Decision) {
        self.decisions.push(decision.clone());
    }

    fn on_sim_end(&mut self, operations: usize) {
        self.ended = Some(operations);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::SimError;
    use mcr_core::CoreError;
    use mcr_decision::DecisionError;

    #[test]
    fn builds_both_matrices() {
        let sim = builder(config()).build().unwrap();
        let n = sim.graph().node_count();
        assert_eq!(sim.quickest().len(), n * n);
        assert_eq!(sim.fuel_efficient().len(), n * n);
        assert_eq!(sim.quickest().path_type(), PathType::Quickest);
        assert_eq!(sim.fuel_efficient().path_type(), PathType::FuelEfficient);
        assert_eq!(sim.quickest().trials(), 5);
        assert_eq!(sim.vehicle().location, sim.station());
        assert_eq!(sim.vehicle().fuel, SimConfig::default().fuel_start);
    }

    #[test]
    fn matrices_share_trial_samples() {
        let sim = builder(config()).build().unwrap();
        let s = sim.station();
        let q = sim.quickest().best(s, s).unwrap();
        let f = sim.fuel_efficient().best(s, s).unwrap();
        assert!(q.is_trivial() && f.is_trivial());
    }

    #[test]
    fn unknown_station_errors() {
        let cfg = SimConfig { station: "Depot".into(), ..config() };
        let err = builder(cfg).build().err().unwrap();
        assert!(matches!(err, SimError::UnknownStation(ref s) if s == "Depot"));
    }

    #[test]
    fn invalid_config_errors() {
        let cfg = SimConfig { trials: 0, ..config() };
        let err = builder(cfg).build().err().unwrap();
        assert!(matches!(err, SimError::Config(CoreError::Config { field: "trials", .. })));
    }

    #[test]
    fn frequency_without_emergencies_errors() {
        let err = builder(config())
            .frequency(FrequencyTable::new([0.5; 24]).unwrap())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Decision(DecisionError::MissingEmergencyDistribution)));
    }

    #[test]
    fn emergency_node_must_exist() {
        let dist = EmergencyDistribution::new(vec![(NodeId(99), 1.0)]).unwrap();
        let err = builder(config()).emergencies(dist).build().err().unwrap();
        assert!(matches!(err, SimError::UnknownNode(NodeId(99))));
    }

    #[test]
    fn emergencies_read_from_node_attributes() {
        let mut b = GraphBuilder::new();
        let s = b.add_node("Station", NodeAttrs::at(0.0, 0.0));
        let x = b.add_node("X", NodeAttrs::at(1.0, 0.0).with_emergency_probability(1.0));
        b.add_road(s, x, vec![10.0, 12.0]);
        let sim = SimBuilder::new(b.build().unwrap(), config(), ProbabilisticModel, DijkstraOracle)
            .frequency(FrequencyTable::new([1.0; 24]).unwrap())
            .build()
            .unwrap();
        let x = id(sim.graph(), "X");
        assert_eq!(sim.emergencies().unwrap().probability(x), 1.0);
        assert_eq!(sim.pending().to, x);
    }

    #[test]
    fn first_decision_uses_configured_path_type() {
        let sim = busy(SimConfig { path_type: PathType::FuelEfficient, ..config() });
        assert_eq!(sim.pending().path_type, PathType::FuelEfficient);
        assert_eq!(sim.pending().events, 1);
    }

    #[test]
    fn no_frequency_asks_user() {
        let sim = builder(config()).build().unwrap();
        assert!(sim.pending().needs_user());
    }
}

// ── Operation loop ────────────────────────────────────────────────────────────

#[cfg(test)]
mod loop_tests {
    use super::*;
    use crate::{NoopObserver, SimError};

    #[test]
    fn ask_user_requires_destination() {
        let mut sim = builder(config()).build().unwrap();
        let err = sim.run_operation(&mut NoopObserver, None).err().unwrap();
        assert!(matches!(err, SimError::DestinationRequired));
        assert_eq!(sim.vehicle().operations(), 0);
        assert!(matches!(sim.run(3, &mut NoopObserver), Err(SimError::DestinationRequired)));
    }

    #[test]
    fn manual_destination_routes_quickest() {
        let mut sim = builder(config()).build().unwrap();
        let child = id(sim.graph(), "Child");
        let station = sim.station();
        let report = sim.run_operation(&mut NoopObserver, Some(child)).unwrap();

        assert!(report.manual);
        assert_eq!(report.path_type, PathType::Quickest);
        assert_eq!((report.from, report.to), (station, child));
        assert_eq!(&report.route, sim.quickest().best(station, child).unwrap());
        assert_eq!(sim.vehicle().location, child);
        assert_eq!(sim.vehicle().time_history, vec![report.route.total_time]);
        assert_eq!(sim.vehicle().fuel_history, vec![report.route.total_fuel]);
        assert!(report.fuel_remaining < SimConfig::default().fuel_start);
        assert!(report.response_minutes >= 0.0);
    }

    #[test]
    fn unknown_destination_changes_nothing() {
        let mut sim = builder(config()).build().unwrap();
        let before = sim.vehicle().clone();
        let err = sim.run_operation(&mut NoopObserver, Some(NodeId(42))).err().unwrap();
        assert!(matches!(err, SimError::UnknownNode(NodeId(42))));
        assert_eq!(sim.vehicle(), &before);
    }

    #[test]
    fn clock_advances_by_travel_and_response() {
        let mut sim = busy(config());
        let report = sim.run_operation(&mut NoopObserver, None).unwrap();
        let elapsed = report.finished.elapsed_minutes() - report.departed.elapsed_minutes();
        let expected = report.route.total_time / 60.0 + report.response_minutes;
        assert!((elapsed - expected).abs() < 1e-9);
        assert_eq!(sim.vehicle().clock, report.finished);
    }

    #[test]
    fn fuel_never_negative() {
        let cfg = SimConfig { fuel_start: 0.0, refuel_per_hour: 0.0, ..config() };
        let mut sim = busy(cfg);
        sim.run(3, &mut NoopObserver).unwrap();
        assert!(sim.vehicle().fuel >= 0.0);
    }

    #[test]
    fn events_every_hour_send_vehicle_to_emergencies() {
        let mut sim = busy(config());
        let mut rec = Recorder::default();
        sim.run(4, &mut rec).unwrap();

        let child = id(sim.graph(), "Child");
        let lake = id(sim.graph(), "Lake");
        assert_eq!(rec.operations.len(), 4);
        assert_eq!(rec.decisions.len(), 4);
        assert_eq!(rec.ended, Some(4));
        for (i, op) in rec.operations.iter().enumerate() {
            assert_eq!(op.index, i);
            assert!(!op.manual);
        }
        // The first trip leaves the station for a sampled emergency.
        assert!(rec.operations[0].to == child || rec.operations[0].to == lake);
        assert_eq!(sim.vehicle().operations(), 4);
    }

    #[test]
    fn operations_chain_from_previous_destination() {
        let mut sim = busy(config());
        let mut rec = Recorder::default();
        sim.run(3, &mut rec).unwrap();
        for pair in rec.operations.windows(2) {
            assert_eq!(pair[1].from, pair[0].to);
        }
    }

    #[test]
    fn quiet_hours_wait_at_station() {
        let g = campus();
        let dist = EmergencyDistribution::new(vec![(id(&g, "Child"), 1.0)]).unwrap();
        let mut sim = SimBuilder::new(g, config(), ProbabilisticModel, DijkstraOracle)
            .frequency(FrequencyTable::new([0.0; 24]).unwrap())
            .emergencies(dist)
            .build()
            .unwrap();
        let station = sim.station();

        // No event: stay at the station.
        let first = sim.run_operation(&mut NoopObserver, None).unwrap();
        assert_eq!(first.to, station);
        assert!(first.route.is_trivial());

        // Now parked after the first cycle: wait out the limit.
        let pending = sim.pending().clone();
        assert_eq!(pending.waited_hours, 5);
        assert_eq!(pending.to, station);
        let second = sim.run_operation(&mut NoopObserver, None).unwrap();
        assert_eq!(second.waited_hours, 5);
        assert!(second.departed.elapsed_minutes() >= first.finished.elapsed_minutes() + 300.0 - 1e-9);
    }

    #[test]
    fn fuel_efficient_trip_reads_fuel_efficient_matrix() {
        let mut sim = busy(SimConfig { path_type: PathType::FuelEfficient, ..config() });
        let station = sim.station();
        let report = sim.run_operation(&mut NoopObserver, None).unwrap();
        assert_eq!(report.path_type, PathType::FuelEfficient);
        assert_eq!(&report.route, sim.fuel_efficient().best(station, report.to).unwrap());
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = busy(config());
        let mut b = busy(config());
        let (mut ra, mut rb) = (Recorder::default(), Recorder::default());
        a.run(5, &mut ra).unwrap();
        b.run(5, &mut rb).unwrap();
        assert_eq!(ra.operations, rb.operations);
        assert_eq!(ra.decisions, rb.decisions);
    }
}

// ── Graph updates ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod update_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::SimError;
    use mcr_core::SimRng;
    use mcr_decision::{DecisionError, DecisionInput, DecisionModel, DecisionResult};
    use mcr_matrix::NewNode;
    use mcr_network::EdgeSpec;

    #[test]
    fn remove_node_updates_matrices_and_emergencies() {
        let mut sim = busy(config());
        let lake = id(sim.graph(), "Lake");
        let child = id(sim.graph(), "Child");

        let update = sim.remove_node(lake).unwrap();
        assert_eq!(update.node, lake);
        assert!(!sim.graph().contains_node(lake));
        assert!(sim.quickest().pairs().iter().all(|&(a, b)| a != lake && b != lake));
        assert!(sim.fuel_efficient().pairs().iter().all(|&(a, b)| a != lake && b != lake));
        assert_eq!(sim.quickest().len(), sim.fuel_efficient().len());

        let dist = sim.emergencies().unwrap();
        assert!(!dist.contains(lake));
        assert!((dist.probability(child) - 1.0).abs() < 1e-12);
        assert_ne!(sim.pending().to, lake);
    }

    /// Sends the vehicle to `target` once, then fails every later call.
    struct OneShot {
        target: NodeId,
        calls:  AtomicUsize,
    }

    impl DecisionModel for OneShot {
        fn decide(&self, input: &DecisionInput<'_>, _rng: &mut SimRng) -> DecisionResult<Decision> {
            if self.calls.fetch_add(1, Ordering::Relaxed) > 0 {
                return Err(DecisionError::EmptyDistribution);
            }
            Ok(Decision {
                from:         input.current,
                to:           self.target,
                path_type:    PathType::Quickest,
                fuel_to_add:  0.0,
                low_fuel:     false,
                events:       1,
                waited_hours: 0,
                clock:        input.clock,
            })
        }
    }

    #[test]
    fn failed_redecision_restores_state() {
        let g = campus();
        let (lake, child) = (id(&g, "Lake"), id(&g, "Child"));
        let dist = EmergencyDistribution::new(vec![(child, 0.5), (lake, 0.5)]).unwrap();
        let model = OneShot { target: lake, calls: AtomicUsize::new(0) };
        let mut sim = SimBuilder::new(g, config(), model, DijkstraOracle).emergencies(dist).build().unwrap();
        assert_eq!(sim.pending().to, lake);

        let (q, f, pending) = (sim.quickest().clone(), sim.fuel_efficient().clone(), sim.pending().clone());
        let err = sim.remove_node(lake).err().unwrap();
        assert!(matches!(err, SimError::Decision(DecisionError::EmptyDistribution)));

        assert!(sim.graph().contains_node(lake));
        assert_eq!(sim.quickest(), &q);
        assert_eq!(sim.fuel_efficient(), &f);
        assert_eq!(sim.pending(), &pending);
        assert!(sim.emergencies().unwrap().contains(lake));
    }

    #[test]
    fn station_cannot_be_removed() {
        let mut sim = builder(config()).build().unwrap();
        let station = sim.station();
        let err = sim.remove_node(station).err().unwrap();
        assert!(matches!(err, SimError::ProtectedNode(ref n) if n == "Station"));
        assert!(sim.graph().contains_node(station));
    }

    #[test]
    fn current_location_cannot_be_removed() {
        let mut sim = builder(config()).build().unwrap();
        let child = id(sim.graph(), "Child");
        sim.run_operation(&mut crate::NoopObserver, Some(child)).unwrap();
        assert!(matches!(sim.remove_node(child), Err(SimError::ProtectedNode(_))));
    }

    #[test]
    fn add_node_extends_both_matrices() {
        let mut sim = builder(config()).build().unwrap();
        let child = id(sim.graph(), "Child");
        let station = sim.station();
        let before = sim.quickest().clone();

        let new = NewNode::new("Annex", NodeAttrs::at(8.0, 2.0))
            .with_edge(child, EdgeSpec::new(0.1, vec![30.0, 40.0]));
        let update = sim.add_node(new).unwrap();
        let annex = update.node;

        for m in [sim.quickest(), sim.fuel_efficient()] {
            assert!(m.contains(annex, station));
            assert!(m.contains(station, annex));
            assert!(m.contains(annex, annex));
        }
        for ((a, b), entry) in before.iter() {
            assert_eq!(sim.quickest().get(a, b), Some(entry));
        }
        let q = sim.quickest().best(station, annex).unwrap();
        let f = sim.fuel_efficient().best(station, annex).unwrap();
        assert!(q.visits(child) && f.visits(child));
    }

    #[test]
    fn failed_add_changes_nothing() {
        let mut sim = builder(config()).build().unwrap();
        let (q, f, nodes) = (sim.quickest().clone(), sim.fuel_efficient().clone(), sim.graph().node_count());

        let new = NewNode::new("Nowhere", NodeAttrs::at(50.0, 50.0))
            .with_edge(NodeId(77), EdgeSpec::new(0.0, vec![10.0]));
        assert!(sim.add_node(new).is_err());
        assert_eq!(sim.quickest(), &q);
        assert_eq!(sim.fuel_efficient(), &f);
        assert_eq!(sim.graph().node_count(), nodes);
    }
}
