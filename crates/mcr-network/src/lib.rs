//! `mcr-network`: location graph, cost model, stochastic edge weights, and
//! shortest-path search.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`graph`]   | `Graph` (arena), `GraphBuilder`, `NodeAttrs`, `EdgeSpec`    |
//! | [`cost`]    | `distance`, `edge_length`, `fuel_cost`, `composite_weight`  |
//! | [`weights`] | `WeightGenerator`, `WeightReport`, `NonPositiveWeight`      |
//! | [`router`]  | `ShortestPathOracle` trait, `PathResult`, `DijkstraOracle`  |
//! | [`error`]   | `GraphError`, `WeightError`, `RouteError`                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public input types.     |

pub mod cost;
pub mod error;
pub mod graph;
pub mod router;
pub mod weights;


pub use error::{GraphError, GraphResult, RouteError, RouteResult, WeightError, WeightResult};
pub use graph::{Edge, EdgeSample, EdgeSpec, Graph, GraphBuilder, Node, NodeAttrs, PendingNode, TrialVectors};
pub use router::{DijkstraOracle, PathResult, ShortestPathOracle};
pub use weights::{NonPositiveWeight, WeightGenerator, WeightReport};
