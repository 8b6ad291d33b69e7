//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use mcr_matrix::PathMatrix;
use mcr_network::Graph;
use mcr_sim::{OperationReport, SimObserver};

use crate::row::{OperationRow, matrix_rows};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes operation rows to any [`OutputWriter`]
/// backend (CSV, SQLite, …).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    written:    usize,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0, last_error: None }
    }

    /// Dump every entry of `matrix`.  Called directly, not from the loop.
    pub fn write_matrix(&mut self, graph: &Graph, matrix: &PathMatrix) -> OutputResult<()> {
        let rows = matrix_rows(graph, matrix);
        self.writer.write_matrix(&rows)?;
        tracing::debug!(rows = rows.len(), path_type = %matrix.path_type(), "path matrix written");
        Ok(())
    }

    /// Operation rows written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  `sim.run()` does this on completion; call it after
    /// driving `run_operation` by hand.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "output write failed");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_operation(&mut self, report: &OperationReport, graph: &Graph) {
        let row = OperationRow::new(graph, report);
        let result = self.writer.write_operation(&row);
        if result.is_ok() {
            self.written += 1;
        }
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _operations: usize) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
