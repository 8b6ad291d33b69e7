//! Fluent builder for constructing a [`Sim`].

use mcr_core::{PathType, SimConfig, SimRng};
use mcr_decision::{Decision, DecisionError, DecisionModel, EmergencyDistribution, FrequencyTable};
use mcr_matrix::MatrixEngine;
use mcr_network::{Graph, ShortestPathOracle, WeightGenerator};
use rand_distr::Normal;

use crate::{Sim, SimError, SimResult, VehicleState};

/// Stream offset separating the simulation RNG from the per-edge RNGs that
/// share the same seed.
const SIM_STREAM: u64 = 1;

/// Fluent builder for [`Sim<D, O>`].
///
/// # Required inputs
///
/// - [`Graph`] from [`mcr_network::GraphBuilder`], with no weights sampled
/// - [`SimConfig`]: trials, seed, fuel, clock, station, …
/// - `D: DecisionModel`, e.g. [`mcr_decision::ProbabilisticModel`]
/// - `O: ShortestPathOracle`, e.g. [`mcr_network::DijkstraOracle`]
///
/// # Optional inputs
///
/// | Method              | Default                                          |
/// |---------------------|--------------------------------------------------|
/// | `.frequency(t)`     | None: every destination is chosen manually       |
/// | `.emergencies(d)`   | Node `emergency_probability` attributes, if any  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(graph, config, ProbabilisticModel, DijkstraOracle)
///     .frequency(table)
///     .build()?;
/// sim.run(10, &mut NoopObserver)?;
/// ```
pub struct SimBuilder<D: DecisionModel, O: ShortestPathOracle> {
    graph:       Graph,
    config:      SimConfig,
    model:       D,
    oracle:      O,
    frequency:   Option<FrequencyTable>,
    emergencies: Option<EmergencyDistribution>,
}

impl<D: DecisionModel, O: ShortestPathOracle> SimBuilder<D, O> {
    /// Create a builder with all required inputs.
    pub fn new(graph: Graph, config: SimConfig, model: D, oracle: O) -> Self {
        Self {
            graph,
            config,
            model,
            oracle,
            frequency:   None,
            emergencies: None,
        }
    }

    /// Hourly event probabilities.  Without them the vehicle never picks a
    /// destination on its own.
    pub fn frequency(mut self, table: FrequencyTable) -> Self {
        self.frequency = Some(table);
        self
    }

    /// Where emergencies happen.  Overrides any per-node attributes.
    pub fn emergencies(mut self, distribution: EmergencyDistribution) -> Self {
        self.emergencies = Some(distribution);
        self
    }

    /// Validate all inputs, sample edge weights, and build both path
    /// matrices.
    ///
    /// # Errors
    ///
    /// - [`SimError::Config`] if `SimConfig::validate` fails.
    /// - [`SimError::UnknownStation`] if no node carries the station name.
    /// - [`SimError::UnknownNode`] if the emergency distribution names a
    ///   node the graph lacks.
    /// - [`SimError::Decision`] if a frequency table is given but no
    ///   emergency distribution can be found.
    /// - [`SimError::Weights`] / [`SimError::Matrix`] if sampling or a
    ///   matrix build fails.
    pub fn build(self) -> SimResult<Sim<D, O>> {
        let SimBuilder { mut graph, config, model, oracle, frequency, emergencies } = self;

        config.validate()?;
        let station = graph
            .node_id(&config.station)
            .ok_or_else(|| SimError::UnknownStation(config.station.clone()))?;

        let emergencies = match emergencies {
            Some(d) => Some(d),
            None if has_emergency_attributes(&graph) => Some(EmergencyDistribution::from_graph(&graph)?),
            None => None,
        };
        if frequency.is_some() && emergencies.is_none() {
            return Err(DecisionError::MissingEmergencyDistribution.into());
        }
        let missing = emergencies
            .as_ref()
            .and_then(|d| d.nodes().iter().copied().find(|&n| !graph.contains_node(n)));
        if let Some(node) = missing {
            return Err(SimError::UnknownNode(node));
        }

        let response = Normal::new(config.response_mean_min, config.response_std_min)
            .map_err(|e| SimError::ResponseTime(e.to_string()))?;

        let quick_gen = WeightGenerator::from_config(&config, PathType::Quickest);
        let eco_gen = WeightGenerator::from_config(&config, PathType::FuelEfficient);

        let report = quick_gen.generate(&mut graph)?;
        if !report.warnings.is_empty() {
            tracing::warn!(clamped = report.warnings.len(), "non-positive weights clamped while sampling");
        }
        quick_gen.check_penalty(&graph);

        let engine = MatrixEngine::new(oracle);
        let quickest = engine.build(&graph, PathType::Quickest)?;
        let mut eco_graph = graph.clone();
        eco_gen.reweight(&mut eco_graph);
        let fuel_efficient = engine.build(&eco_graph, PathType::FuelEfficient)?;

        let vehicle = VehicleState::at_station(station, &config);
        let rng = SimRng::new(config.seed).child(SIM_STREAM);

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            trials = config.trials,
            station = %config.station,
            "simulation ready",
        );

        let pending = Decision {
            from:         station,
            to:           station,
            path_type:    config.path_type,
            fuel_to_add:  0.0,
            low_fuel:     false,
            events:       0,
            waited_hours: 0,
            clock:        vehicle.clock,
        };
        let mut sim = Sim {
            graph,
            quickest,
            fuel_efficient,
            engine,
            model,
            frequency,
            emergencies,
            vehicle,
            station,
            quick_gen,
            eco_gen,
            response,
            rng,
            pending,
            config,
        };

        // The first operation leaves from the station with the configured
        // path preference, unless the destination must come from a human.
        let mut first = sim.decide_next()?;
        if !first.needs_user() {
            first.path_type = sim.config.path_type;
        }
        sim.pending = first;
        Ok(sim)
    }
}

fn has_emergency_attributes(graph: &Graph) -> bool {
    graph
        .node_ids()
        .filter_map(|id| graph.node(id))
        .any(|node| node.attrs.emergency_probability.is_some())
}
