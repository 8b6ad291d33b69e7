//! Immutable simulation configuration.
//!
//! `SimConfig` is constructed once before the simulation loop (in code, or
//! from TOML with the `toml` feature) and passed by reference to everything
//! that needs it.  Nothing mutates it after [`SimConfig::validate`] succeeds.

use crate::{CoreError, CoreResult, MINUTES_PER_DAY, PathType};

/// Trial counts above this log a warning (the build is O(N·V²·E log V)).
const LARGE_TRIAL_COUNT: usize = 1_000;

// ── FuelModel ─────────────────────────────────────────────────────────────────

/// Coefficients of the linear fuel model:
///
/// ```text
/// fuel = base + per_second·time + per_distance·distance + per_climb·|Δelevation|
/// ```
///
/// Coefficients may be negative (e.g. regenerative braking), so the result
/// is not guaranteed to be non-negative.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FuelModel {
    pub base:         f64,
    pub per_second:   f64,
    pub per_distance: f64,
    pub per_climb:    f64,
}

impl FuelModel {
    fn is_finite(&self) -> bool {
        [self.base, self.per_second, self.per_distance, self.per_climb].iter().all(|c| c.is_finite())
    }
}

impl Default for FuelModel {
    fn default() -> Self {
        Self {
            base:         0.0,
            per_second:   0.002,
            per_distance: 0.01,
            per_climb:    0.05,
        }
    }
}

// ── Weighting ─────────────────────────────────────────────────────────────────

/// Coefficients combining one trial's edge sample into a composite weight:
///
/// ```text
/// weight = time·time_scale·time + distance·d + elevation·|Δe| + fuel·f
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Weighting {
    pub time:      f64,
    pub distance:  f64,
    pub elevation: f64,
    pub fuel:      f64,
}

impl Weighting {
    /// Weighting that favours short travel times.
    pub const QUICKEST: Weighting = Weighting { time: 1.0, distance: 0.1, elevation: 0.0, fuel: 0.1 };

    /// Weighting that favours low fuel consumption.
    pub const FUEL_EFFICIENT: Weighting = Weighting { time: 0.05, distance: 0.1, elevation: 0.5, fuel: 10.0 };

    fn is_finite(&self) -> bool {
        [self.time, self.distance, self.elevation, self.fuel].iter().all(|c| c.is_finite())
    }
}

impl Default for Weighting {
    fn default() -> Self {
        Self::QUICKEST
    }
}

// ── DistanceSource ────────────────────────────────────────────────────────────

/// Which coordinates define an edge's static distance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceSource {
    /// Euclidean distance between plane positions.
    #[default]
    Plane,
    /// Haversine metres when both endpoints carry a `GeoPoint`, plane
    /// distance otherwise.
    World,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Monte Carlo trials per node pair.  Must be ≥ 1.
    pub trials: usize,

    /// Master RNG seed.  The same seed always produces identical matrices
    /// and decisions.
    pub seed: u64,

    /// Obstruction probability for edges that do not specify their own.
    pub obstruction_probability: f64,

    /// Added to an edge's weight in every trial where it is obstructed.
    /// Must dominate any unobstructed route weight.
    pub obstruction_penalty: f64,

    /// Floor applied to non-positive composite weights.
    pub min_weight: f64,

    /// Multiplier turning sampled seconds into weight units.
    pub time_scale: f64,

    pub distance_source: DistanceSource,

    pub fuel_model: FuelModel,

    /// Weighting used to build the quickest matrix.
    pub quickest: Weighting,

    /// Weighting used to build the fuel-efficient matrix.
    pub fuel_efficient: Weighting,

    /// Vehicle fuel capacity.
    pub fuel_capacity: f64,

    /// Fuel at the start of operations.
    pub fuel_start: f64,

    /// Fuel replenished per hour parked at the station.
    pub refuel_per_hour: f64,

    /// Start of operations, minutes past midnight (`< 1440`).
    pub start_minute: f64,

    /// Name of the station (recharging/origin) node.
    pub station: String,

    /// Path type for the first operation.
    pub path_type: PathType,

    /// Upper bound on hours simulated while waiting at the station for the
    /// next event.
    pub max_wait_hours: u32,

    /// Mean on-scene response time, minutes.
    pub response_mean_min: f64,

    /// Standard deviation of the on-scene response time, minutes.
    pub response_std_min: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials:                  100,
            seed:                    42,
            obstruction_probability: 0.1,
            obstruction_penalty:     1.0e6,
            min_weight:              1.0e-6,
            time_scale:              1.0 / 60.0,
            distance_source:         DistanceSource::Plane,
            fuel_model:              FuelModel::default(),
            quickest:                Weighting::QUICKEST,
            fuel_efficient:          Weighting::FUEL_EFFICIENT,
            fuel_capacity:           120.0,
            fuel_start:              120.0,
            refuel_per_hour:         20.0,
            start_minute:            720.0,
            station:                 "Station".to_owned(),
            path_type:               PathType::Quickest,
            max_wait_hours:          72,
            response_mean_min:       8.0,
            response_std_min:        1.5,
        }
    }
}

impl SimConfig {
    /// The weighting a matrix of `path_type` is built with.
    ///
    /// Returns `None` for [`PathType::AskUser`].
    pub fn weighting(&self, path_type: PathType) -> Option<&Weighting> {
        match path_type {
            PathType::Quickest      => Some(&self.quickest),
            PathType::FuelEfficient => Some(&self.fuel_efficient),
            PathType::AskUser       => None,
        }
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> CoreResult<()> {
        if self.trials == 0 {
            return Err(CoreError::config("trials", "must be at least 1"));
        }
        if self.trials > LARGE_TRIAL_COUNT {
            tracing::warn!(trials = self.trials, "large trial count; matrix builds will be slow");
        }
        if !(0.0..=1.0).contains(&self.obstruction_probability) {
            return Err(CoreError::config("obstruction_probability", "must be between 0.0 and 1.0"));
        }
        if !(self.obstruction_penalty.is_finite() && self.obstruction_penalty > 0.0) {
            return Err(CoreError::config("obstruction_penalty", "must be a positive number"));
        }
        if !(self.min_weight.is_finite() && self.min_weight > 0.0) {
            return Err(CoreError::config("min_weight", "must be a positive number"));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(CoreError::config("time_scale", "must be a positive number"));
        }
        if !self.fuel_model.is_finite() {
            return Err(CoreError::config("fuel_model", "coefficients must be finite"));
        }
        if !self.quickest.is_finite() {
            return Err(CoreError::config("quickest", "coefficients must be finite"));
        }
        if !self.fuel_efficient.is_finite() {
            return Err(CoreError::config("fuel_efficient", "coefficients must be finite"));
        }
        if !(self.fuel_capacity.is_finite() && self.fuel_capacity > 0.0) {
            return Err(CoreError::config("fuel_capacity", "must be a positive number"));
        }
        if !(0.0..=self.fuel_capacity).contains(&self.fuel_start) {
            return Err(CoreError::config(
                "fuel_start",
                format!("must be between 0 and fuel_capacity ({})", self.fuel_capacity),
            ));
        }
        if !(self.refuel_per_hour.is_finite() && self.refuel_per_hour >= 0.0) {
            return Err(CoreError::config("refuel_per_hour", "must be zero or positive"));
        }
        if !(0.0..MINUTES_PER_DAY).contains(&self.start_minute) {
            return Err(CoreError::config(
                "start_minute",
                format!("must be in [0, 1440), got {}", self.start_minute),
            ));
        }
        if self.station.trim().is_empty() {
            return Err(CoreError::config("station", "must name a node"));
        }
        if !self.path_type.is_buildable() {
            return Err(CoreError::config("path_type", "must be quickest or fuel_efficient"));
        }
        if self.max_wait_hours == 0 {
            return Err(CoreError::config("max_wait_hours", "must be at least 1"));
        }
        if !(self.response_mean_min.is_finite() && self.response_mean_min >= 0.0) {
            return Err(CoreError::config("response_mean_min", "must be zero or positive"));
        }
        if !(self.response_std_min.is_finite() && self.response_std_min >= 0.0) {
            return Err(CoreError::config("response_std_min", "must be zero or positive"));
        }
        Ok(())
    }
}

#[cfg(feature = "toml")]
impl SimConfig {
    /// Parse and validate a TOML document.  Missing keys take their
    /// [`Default`] values.
    pub fn from_toml_str(toml_str: &str) -> CoreResult<Self> {
        let config: SimConfig =
            toml::from_str(toml_str).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
