//! `mcr-core`: foundational types for the Monte Carlo vehicle router.
//!
//! This crate is a dependency of every other `mcr-*` crate.  It has no
//! `mcr-*` dependencies and minimal external ones (`rand`, `thiserror`,
//! `tracing`, plus optional `serde`/`toml`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`                                    |
//! | [`geo`]         | `Position` (plane), `GeoPoint` (haversine)            |
//! | [`clock`]       | `ClockTime`: minute of day, wrapping at 1440         |
//! | [`rng`]         | `EdgeRng` (per-edge), `SimRng` (global)               |
//! | [`stats`]       | `mean`, `sample_std_dev`, `sigma_threshold`           |
//! | [`path_type`]   | `PathType` enum                                       |
//! | [`config`]      | `SimConfig`, `FuelModel`, `Weighting`                 |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//! | `toml`  | `SimConfig::from_toml_str` / `from_toml_file`.             |

pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod path_type;
pub mod rng;
pub mod stats;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use clock::{ClockTime, MINUTES_PER_DAY};
pub use config::{DistanceSource, FuelModel, SimConfig, Weighting};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, Position};
pub use ids::{EdgeId, NodeId};
pub use path_type::PathType;
pub use rng::{EdgeRng, SimRng};
