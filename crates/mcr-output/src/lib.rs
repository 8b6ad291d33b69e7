//! `mcr-output`: report writers for path matrices and vehicle operations.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                          |
//! |-----------|---------|----------------------------------------|
//! | *(none)*  | CSV     | `path_matrix.csv`, `operations.csv`    |
//! | `sqlite`  | SQLite  | `output.db`                            |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `mcr_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcr_output::{CsvWriter, SimOutputObserver};
//!
//! let mut obs = SimOutputObserver::new(CsvWriter::new(Path::new("./output"))?);
//! obs.write_matrix(sim.graph(), sim.quickest())?;
//! sim.run(10, &mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{OperationRow, PathMatrixRow, matrix_rows, render_route};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
