//! `mcr-matrix`: Monte Carlo all-pairs path matrix.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`matrix`] | `PathMatrix`, `PathMatrixEntry`                                |
//! | [`engine`] | `MatrixEngine<O>`: build, `add_node`, `remove_node`           |
//! | [`error`]  | `MatrixError`, `MatrixResult<T>`                               |
//!
//! # Build model
//!
//! 1. The graph's edges carry N sampled trials (see
//!    [`WeightGenerator`](mcr_network::WeightGenerator)).
//! 2. For each trial *t*, a scratch copy of the graph materializes *t* and
//!    the oracle answers every ordered pair.
//! 3. Per pair, the lowest-weight trial becomes `best`; the number of
//!    trials reproducing that exact edge list becomes `repeat_count`.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Runs trials on Rayon's thread pool.                        |
//! | `fx-hash`  | Uses FxHash for the pair map.                              |

pub mod engine;
pub mod error;
pub mod matrix;


pub use engine::{MatrixEngine, MatrixUpdate, NewNode};
pub use error::{MatrixError, MatrixResult};
pub use matrix::{PathMatrix, PathMatrixEntry};
