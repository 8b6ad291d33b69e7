//! Mutable state of the response vehicle between operations.

use mcr_core::{ClockTime, NodeId, SimConfig};

/// Where the vehicle is, how much fuel it carries, and what its past trips
/// cost.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub location: NodeId,
    pub fuel:     f64,
    pub clock:    ClockTime,

    /// Travel time (seconds) of every completed operation, oldest first.
    pub time_history: Vec<f64>,
    /// Fuel consumed by every completed operation, oldest first.
    pub fuel_history: Vec<f64>,
}

impl VehicleState {
    /// Parked at `station` with the configured starting fuel and clock.
    pub fn at_station(station: NodeId, config: &SimConfig) -> Self {
        Self {
            location:     station,
            fuel:         config.fuel_start,
            clock:        ClockTime::new(config.start_minute),
            time_history: Vec::new(),
            fuel_history: Vec::new(),
        }
    }

    /// Number of completed operations.
    #[inline]
    pub fn operations(&self) -> usize {
        self.time_history.len()
    }

    /// Add `amount` of fuel, never exceeding `capacity`.
    pub fn refuel(&mut self, amount: f64, capacity: f64) {
        self.fuel = (self.fuel + amount.max(0.0)).min(capacity);
    }

    /// Burn `amount` of fuel; the tank never goes below empty.
    pub fn consume(&mut self, amount: f64) {
        self.fuel = (self.fuel - amount).max(0.0);
    }
}
