//! The destination decision procedure.
//!
//! ```text
//! no frequency data          → AskUser
//! parked at station (not 1st) → wait hour by hour for one event, refuelling
//! otherwise                   → one Bernoulli draw per lookahead hour
//!
//! event:    low fuel → station, FuelEfficient
//!           >1 event → Quickest
//!           1 event  → Quickest if the predicted trip is slower than usual,
//!                      FuelEfficient otherwise
//! no event: station, FuelEfficient
//! ```

use mcr_core::{ClockTime, PathType, SimRng, stats};

use crate::{Decision, DecisionError, DecisionInput, DecisionResult};

/// Fuel below `mean + FUEL_SIGMA·σ` of past consumption counts as low.
const FUEL_SIGMA: f64 = 3.0;
/// A trip slower than `mean + TIME_SIGMA·σ` of past trips counts as slow.
const TIME_SIGMA: f64 = 0.5;
/// From this minute of the hour on, the next hour joins the lookahead window.
const LOOKAHEAD_MINUTE: f64 = 30.0;

/// Fuel level below which the vehicle must return to the station.
///
/// Two or more samples: `mean + 3σ`.  One sample: twice that sample.
/// None: no threshold.
pub fn fuel_threshold(fuel_history: &[f64]) -> Option<f64> {
    match fuel_history {
        [] => None,
        [only] => Some(2.0 * only),
        _ => stats::sigma_threshold(fuel_history, FUEL_SIGMA),
    }
}

/// Travel time above which a predicted trip counts as slow.  Needs at least
/// two samples.
pub fn time_threshold(time_history: &[f64]) -> Option<f64> {
    stats::sigma_threshold(time_history, TIME_SIGMA)
}

/// Hours considered for the next event: the current hour, plus the next
/// one once half of the current hour has passed.
pub fn lookahead_hours(clock: ClockTime) -> Vec<usize> {
    let hour = clock.hour();
    if clock.minute_of_hour() >= LOOKAHEAD_MINUTE {
        vec![hour, (hour + 1) % 24]
    } else {
        vec![hour]
    }
}

/// Predict the next destination and path type.
pub fn decide_destination(input: &DecisionInput<'_>, rng: &mut SimRng) -> DecisionResult<Decision> {
    let mut clock = input.clock;
    let mut fuel_to_add = 0.0;
    let mut waited_hours = 0;

    let threshold = fuel_threshold(input.fuel_history);
    let is_low = |fuel_to_add: f64| threshold.is_some_and(|t| input.fuel + fuel_to_add < t);

    let Some(frequency) = input.frequency else {
        tracing::debug!("no frequency data; destination must be chosen manually");
        return Ok(Decision {
            from: input.current,
            to: input.station,
            path_type: PathType::AskUser,
            fuel_to_add,
            low_fuel: is_low(fuel_to_add),
            events: 0,
            waited_hours,
            clock,
        });
    };

    let events = if input.current == input.station && !input.first_cycle {
        let mut happened = 0;
        while waited_hours < input.max_wait_hours {
            if rng.gen_bool(frequency.probability(clock.hour())) {
                happened = 1;
                break;
            }
            clock.advance_hours(1);
            waited_hours += 1;
            let room = (input.fuel_capacity - input.fuel - fuel_to_add).max(0.0);
            fuel_to_add += input.refuel_per_hour.min(room);
        }
        if happened == 0 {
            tracing::debug!(waited_hours, "no event before the wait limit");
        }
        happened
    } else {
        lookahead_hours(clock)
            .into_iter()
            .filter(|&h| rng.gen_bool(frequency.probability(h)))
            .count() as u32
    };

    let low_fuel = is_low(fuel_to_add);
    let (to, path_type) = if events == 0 {
        (input.station, PathType::FuelEfficient)
    } else {
        let emergencies = input.emergencies.ok_or(DecisionError::MissingEmergencyDistribution)?;
        let target = emergencies.sample(rng);
        if low_fuel {
            (input.station, PathType::FuelEfficient)
        } else if events > 1 {
            (target, PathType::Quickest)
        } else {
            let predicted = input.quickest.best(input.station, target)?.total_time;
            match time_threshold(input.time_history) {
                Some(limit) if predicted <= limit => (target, PathType::FuelEfficient),
                _ => (target, PathType::Quickest),
            }
        }
    };

    if low_fuel {
        tracing::info!(fuel = input.fuel + fuel_to_add, threshold = ?threshold, "low fuel; returning to station");
    }

    Ok(Decision {
        from: input.current,
        to,
        path_type,
        fuel_to_add,
        low_fuel,
        events,
        waited_hours,
        clock,
    })
}
