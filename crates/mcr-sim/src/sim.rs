//! The `Sim` struct and its operation loop.

use mcr_core::{NodeId, PathType, SimConfig, SimRng};
use mcr_decision::{Decision, DecisionInput, DecisionModel, EmergencyDistribution, FrequencyTable};
use mcr_matrix::{MatrixEngine, MatrixUpdate, NewNode, PathMatrix};
use mcr_network::{Graph, ShortestPathOracle, WeightGenerator};
use rand_distr::{Distribution, Normal};

use crate::{OperationReport, SimError, SimObserver, SimResult, VehicleState};

/// The main simulation runner.
///
/// `Sim<D, O>` owns the graph (weighted for the quickest matrix), both path
/// matrices, and the vehicle.  Each operation:
///
/// 1. **Resolve** the pending [`Decision`]; `AskUser` takes the caller's
///    destination and routes it `Quickest`.
/// 2. **Refuel** by the decision's `fuel_to_add` and jump to its clock.
/// 3. **Drive** the best route from the matching matrix, burning its fuel
///    and advancing the clock by travel plus on-scene response time.
/// 4. **Record** the trip in the histories and report it.
/// 5. **Decide** the next destination.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<D: DecisionModel, O: ShortestPathOracle> {
    pub(crate) config:         SimConfig,
    pub(crate) graph:          Graph,
    pub(crate) quickest:       PathMatrix,
    pub(crate) fuel_efficient: PathMatrix,
    pub(crate) engine:         MatrixEngine<O>,
    pub(crate) model:          D,
    pub(crate) frequency:      Option<FrequencyTable>,
    pub(crate) emergencies:    Option<EmergencyDistribution>,
    pub(crate) vehicle:        VehicleState,
    pub(crate) station:        NodeId,
    pub(crate) quick_gen:      WeightGenerator,
    pub(crate) eco_gen:        WeightGenerator,
    pub(crate) response:       Normal<f64>,
    pub(crate) rng:            SimRng,
    pub(crate) pending:        Decision,
}

impl<D: DecisionModel, O: ShortestPathOracle> Sim<D, O> {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The graph with its active weights set for the quickest matrix.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn quickest(&self) -> &PathMatrix {
        &self.quickest
    }

    pub fn fuel_efficient(&self) -> &PathMatrix {
        &self.fuel_efficient
    }

    /// The matrix routes of `path_type` are read from.  `None` for
    /// `AskUser`.
    pub fn matrix(&self, path_type: PathType) -> Option<&PathMatrix> {
        match path_type {
            PathType::Quickest      => Some(&self.quickest),
            PathType::FuelEfficient => Some(&self.fuel_efficient),
            PathType::AskUser       => None,
        }
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn station(&self) -> NodeId {
        self.station
    }

    /// The decision the next operation will carry out.
    pub fn pending(&self) -> &Decision {
        &self.pending
    }

    pub fn emergencies(&self) -> Option<&EmergencyDistribution> {
        self.emergencies.as_ref()
    }

    pub fn frequency(&self) -> Option<&FrequencyTable> {
        self.frequency.as_ref()
    }

    // ── Operation loop ────────────────────────────────────────────────────

    /// Run `operations` operations, each following the model's decision.
    ///
    /// Stops at the first failure and returns it; operations completed
    /// before that stay recorded.  A pending `AskUser` decision fails with
    /// [`SimError::DestinationRequired`]: drive it with
    /// [`run_operation`](Self::run_operation) instead.
    pub fn run<Obs: SimObserver>(&mut self, operations: usize, observer: &mut Obs) -> SimResult<()> {
        for _ in 0..operations {
            self.run_operation(observer, None)?;
        }
        observer.on_sim_end(self.vehicle.operations());
        Ok(())
    }

    /// Carry out the pending decision, then decide the next one.
    ///
    /// `manual` replaces the decided destination.  It is required when the
    /// pending decision is `AskUser`, in which case the route is read from
    /// the quickest matrix; otherwise the decided path type is kept.
    ///
    /// Nothing changes when this returns an error before the trip starts
    /// (unknown destination, missing entry).
    pub fn run_operation<Obs: SimObserver>(
        &mut self,
        observer: &mut Obs,
        manual:   Option<NodeId>,
    ) -> SimResult<OperationReport> {
        let decision = self.pending.clone();
        let (to, path_type) = match (decision.needs_user(), manual) {
            (true, None)      => return Err(SimError::DestinationRequired),
            (true, Some(to))  => (to, PathType::Quickest),
            (false, Some(to)) => (to, decision.path_type),
            (false, None)     => (decision.to, decision.path_type),
        };
        if !self.graph.contains_node(to) {
            return Err(SimError::UnknownNode(to));
        }

        let from = self.vehicle.location;
        let matrix = match path_type {
            PathType::FuelEfficient => &self.fuel_efficient,
            _                       => &self.quickest,
        };
        let entry = matrix.entry(from, to)?;
        let route = entry.best.clone();
        let confidence = entry.confidence();

        let fuel_before = self.vehicle.fuel;
        self.vehicle.refuel(decision.fuel_to_add, self.config.fuel_capacity);
        let fuel_added = self.vehicle.fuel - fuel_before;
        self.vehicle.clock = decision.clock;
        let departed = self.vehicle.clock;

        let response_minutes = self.response.sample(self.rng.inner()).max(0.0);
        self.vehicle.consume(route.total_fuel);
        self.vehicle.clock.advance_minutes(route.total_time / 60.0 + response_minutes);
        self.vehicle.time_history.push(route.total_time);
        self.vehicle.fuel_history.push(route.total_fuel);
        self.vehicle.location = to;

        let report = OperationReport {
            index: self.vehicle.operations() - 1,
            from,
            to,
            path_type,
            manual: manual.is_some(),
            low_fuel: decision.low_fuel,
            confidence,
            waited_hours: decision.waited_hours,
            fuel_added,
            fuel_used: route.total_fuel,
            fuel_remaining: self.vehicle.fuel,
            response_minutes,
            departed,
            finished: self.vehicle.clock,
            route,
        };
        tracing::info!(
            operation = report.index,
            from = %self.graph.node_name(from),
            to = %self.graph.node_name(to),
            %path_type,
            time_s = report.route.total_time,
            fuel = report.fuel_used,
            fuel_remaining = report.fuel_remaining,
            clock = %report.finished,
            "operation complete",
        );
        observer.on_operation(&report, &self.graph);

        self.pending = self.decide_next()?;
        observer.on_decision(&self.pending);
        Ok(report)
    }

    /// Ask the model where to go from the vehicle's current state.
    pub(crate) fn decide_next(&mut self) -> SimResult<Decision> {
        let input = DecisionInput {
            current:         self.vehicle.location,
            station:         self.station,
            fuel:            self.vehicle.fuel,
            clock:           self.vehicle.clock,
            frequency:       self.frequency.as_ref(),
            emergencies:     self.emergencies.as_ref(),
            time_history:    &self.vehicle.time_history,
            fuel_history:    &self.vehicle.fuel_history,
            first_cycle:     self.vehicle.operations() == 0,
            fuel_capacity:   self.config.fuel_capacity,
            refuel_per_hour: self.config.refuel_per_hour,
            max_wait_hours:  self.config.max_wait_hours,
            quickest:        &self.quickest,
        };
        let decision = self.model.decide(&input, &mut self.rng)?;
        tracing::debug!(
            to = %self.graph.node_name(decision.to),
            path_type = %decision.path_type,
            events = decision.events,
            waited_hours = decision.waited_hours,
            "next destination decided",
        );
        Ok(decision)
    }

    // ── Graph updates ─────────────────────────────────────────────────────

    /// Insert a node into the graph and both matrices.
    ///
    /// The new edges are sampled once per matrix from the same per-edge
    /// seeds, so both matrices see identical trials.  Either both matrices
    /// and the graph change, or nothing does.  Returns the quickest
    /// matrix's update.
    pub fn add_node(&mut self, new: NewNode) -> SimResult<MatrixUpdate> {
        let mut graph = self.graph.clone();
        let mut quickest = self.quickest.clone();
        let update = self.engine.add_node(&mut graph, &mut quickest, new.clone(), &self.quick_gen)?;

        let mut eco_graph = self.graph.clone();
        self.eco_gen.reweight(&mut eco_graph);
        let mut fuel_efficient = self.fuel_efficient.clone();
        self.engine.add_node(&mut eco_graph, &mut fuel_efficient, new, &self.eco_gen)?;

        self.graph = graph;
        self.quickest = quickest;
        self.fuel_efficient = fuel_efficient;
        Ok(update)
    }

    /// Remove a node from the graph and both matrices, and drop it from the
    /// emergency distribution.
    ///
    /// The station and the vehicle's current location cannot be removed.
    /// If the pending decision targeted the node, a new one is made; when
    /// that fails the graph, matrices and emergencies are restored.
    /// Returns the quickest matrix's update.
    pub fn remove_node(&mut self, node: NodeId) -> SimResult<MatrixUpdate> {
        let name = self
            .graph
            .node(node)
            .map(|n| n.name.clone())
            .ok_or(SimError::UnknownNode(node))?;
        if node == self.station || node == self.vehicle.location {
            return Err(SimError::ProtectedNode(name));
        }

        let emergencies = match &self.emergencies {
            Some(d) if d.contains(node) => Some(d.without(node)?),
            other => other.clone(),
        };

        let mut graph = self.graph.clone();
        let mut quickest = self.quickest.clone();
        let update = self.engine.remove_node(&mut graph, &mut quickest, node)?;

        let mut eco_graph = self.graph.clone();
        self.eco_gen.reweight(&mut eco_graph);
        let mut fuel_efficient = self.fuel_efficient.clone();
        self.engine.remove_node(&mut eco_graph, &mut fuel_efficient, node)?;

        let rng = self.rng.clone();
        let graph = std::mem::replace(&mut self.graph, graph);
        let quickest = std::mem::replace(&mut self.quickest, quickest);
        let fuel_efficient = std::mem::replace(&mut self.fuel_efficient, fuel_efficient);
        let emergencies = std::mem::replace(&mut self.emergencies, emergencies);

        if self.pending.to == node {
            tracing::info!(node = %name, "pending destination removed; deciding again");
            match self.decide_next() {
                Ok(decision) => self.pending = decision,
                Err(e) => {
                    self.graph = graph;
                    self.quickest = quickest;
                    self.fuel_efficient = fuel_efficient;
                    self.emergencies = emergencies;
                    self.rng = rng;
                    return Err(e);
                }
            }
        }
        Ok(update)
    }
}
