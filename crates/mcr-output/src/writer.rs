//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OperationRow, OutputResult, PathMatrixRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// When driven by [`SimOutputObserver`][crate::SimOutputObserver], errors
/// are stored and retrieved with
/// [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of path matrix entries.
    fn write_matrix(&mut self, rows: &[PathMatrixRow]) -> OutputResult<()>;

    /// Write one operation row.
    fn write_operation(&mut self, row: &OperationRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
