//! Distance and cost model.
//!
//! Pure functions only.  Nothing here touches RNG or graph state.

use mcr_core::{DistanceSource, FuelModel, Position, Weighting};

use crate::graph::NodeAttrs;

/// Euclidean distance between two plane positions.
#[inline]
pub fn distance(a: Position, b: Position) -> f64 {
    a.distance(b)
}

/// Static length of an edge between nodes with attributes `a` and `b`.
///
/// With [`DistanceSource::World`] and a `GeoPoint` on both endpoints the
/// haversine distance in metres is used; otherwise plane distance.
pub fn edge_length(a: &NodeAttrs, b: &NodeAttrs, source: DistanceSource) -> f64 {
    match (source, a.world, b.world) {
        (DistanceSource::World, Some(wa), Some(wb)) => wa.distance_m(wb),
        _ => distance(a.pos, b.pos),
    }
}

/// Fuel used to travel `distance` in `time` seconds with elevation change
/// `elevation_delta`.  Only the magnitude of the climb counts.
#[inline]
pub fn fuel_cost(model: &FuelModel, time: f64, distance: f64, elevation_delta: f64) -> f64 {
    model.base
        + model.per_second * time
        + model.per_distance * distance
        + model.per_climb * elevation_delta.abs()
}

/// Composite weight of one trial before obstruction and clamping.
#[inline]
pub fn composite_weight(
    weighting: &Weighting,
    time_scale: f64,
    time: f64,
    distance: f64,
    elevation_delta: f64,
    fuel: f64,
) -> f64 {
    weighting.time * time_scale * time
        + weighting.distance * distance
        + weighting.elevation * elevation_delta.abs()
        + weighting.fuel * fuel
}
