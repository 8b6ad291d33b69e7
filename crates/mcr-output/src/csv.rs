//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `path_matrix.csv`
//! - `operations.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OperationRow, OutputResult, PathMatrixRow};

pub const MATRIX_FILE: &str = "path_matrix.csv";
pub const OPERATIONS_FILE: &str = "operations.csv";

pub const MATRIX_HEADER: [&str; 12] = [
    "path_type", "from", "to", "weight", "total_time", "total_distance",
    "total_elevation", "total_fuel", "repeat_count", "trials", "confidence", "route",
];

pub const OPERATIONS_HEADER: [&str; 19] = [
    "index", "from", "to", "path_type", "manual", "low_fuel", "waited_hours",
    "departed_day", "departed", "finished_day", "finished", "travel_time", "distance",
    "fuel_added", "fuel_used", "fuel_remaining", "response_minutes", "confidence", "route",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    matrix:     Writer<File>,
    operations: Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut matrix = Writer::from_path(dir.join(MATRIX_FILE))?;
        matrix.write_record(MATRIX_HEADER)?;

        let mut operations = Writer::from_path(dir.join(OPERATIONS_FILE))?;
        operations.write_record(OPERATIONS_HEADER)?;

        Ok(Self {
            matrix,
            operations,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_matrix(&mut self, rows: &[PathMatrixRow]) -> OutputResult<()> {
        for row in rows {
            self.matrix.write_record(&[
                row.path_type.as_str().to_owned(),
                row.from.clone(),
                row.to.clone(),
                row.weight.to_string(),
                row.total_time.to_string(),
                row.total_distance.to_string(),
                row.total_elevation.to_string(),
                row.total_fuel.to_string(),
                row.repeat_count.to_string(),
                row.trials.to_string(),
                row.confidence.to_string(),
                row.route.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_operation(&mut self, row: &OperationRow) -> OutputResult<()> {
        self.operations.write_record(&[
            row.index.to_string(),
            row.from.clone(),
            row.to.clone(),
            row.path_type.as_str().to_owned(),
            (row.manual as u8).to_string(),
            (row.low_fuel as u8).to_string(),
            row.waited_hours.to_string(),
            row.departed_day.to_string(),
            row.departed.clone(),
            row.finished_day.to_string(),
            row.finished.clone(),
            row.travel_time.to_string(),
            row.distance.to_string(),
            row.fuel_added.to_string(),
            row.fuel_used.to_string(),
            row.fuel_remaining.to_string(),
            row.response_minutes.to_string(),
            row.confidence.to_string(),
            row.route.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.matrix.flush()?;
        self.operations.flush()?;
        Ok(())
    }
}
