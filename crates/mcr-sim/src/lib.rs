//! `mcr-sim`: the operation loop of a single response vehicle.
//!
//! # Operation loop
//!
//! ```text
//! SimBuilder::build
//!   └─ sample weights ─ quickest matrix ─ fuel-efficient matrix ─ first decision
//!
//! Sim::run_operation
//!   ├─ resolve pending decision (manual destination for AskUser)
//!   ├─ refuel, wait, drive the best route, respond on scene
//!   ├─ record time/fuel history ──────────────► SimObserver::on_operation
//!   └─ decide next destination ───────────────► SimObserver::on_decision
//!
//! Sim::add_node / Sim::remove_node
//!   └─ graph + both matrices, all or nothing
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Matrix trials run on Rayon (forwarded to `mcr-matrix`) |
//! | `fx-hash`  | FxHash pair maps (forwarded to `mcr-matrix`)           |

pub mod builder;
pub mod error;
pub mod observer;
pub mod report;
pub mod sim;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use report::OperationReport;
pub use sim::Sim;
pub use vehicle::VehicleState;
