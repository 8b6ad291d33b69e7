//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `path_matrix` and `operations`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OperationRow, OutputResult, PathMatrixRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS path_matrix (
                 path_type       TEXT    NOT NULL,
                 from_node       TEXT    NOT NULL,
                 to_node         TEXT    NOT NULL,
                 weight          REAL    NOT NULL,
                 total_time      REAL    NOT NULL,
                 total_distance  REAL    NOT NULL,
                 total_elevation REAL    NOT NULL,
                 total_fuel      REAL    NOT NULL,
                 repeat_count    INTEGER NOT NULL,
                 trials          INTEGER NOT NULL,
                 confidence      REAL    NOT NULL,
                 route           TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS operations (
                 idx              INTEGER PRIMARY KEY,
                 from_node        TEXT    NOT NULL,
                 to_node          TEXT    NOT NULL,
                 path_type        TEXT    NOT NULL,
                 manual           INTEGER NOT NULL,
                 low_fuel         INTEGER NOT NULL,
                 waited_hours     INTEGER NOT NULL,
                 departed_day     INTEGER NOT NULL,
                 departed         TEXT    NOT NULL,
                 finished_day     INTEGER NOT NULL,
                 finished         TEXT    NOT NULL,
                 travel_time      REAL    NOT NULL,
                 distance         REAL    NOT NULL,
                 fuel_added       REAL    NOT NULL,
                 fuel_used        REAL    NOT NULL,
                 fuel_remaining   REAL    NOT NULL,
                 response_minutes REAL    NOT NULL,
                 confidence       REAL    NOT NULL,
                 route            TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_matrix(&mut self, rows: &[PathMatrixRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO path_matrix \
                 (path_type, from_node, to_node, weight, total_time, total_distance, \
                  total_elevation, total_fuel, repeat_count, trials, confidence, route) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.path_type.as_str(),
                    row.from,
                    row.to,
                    row.weight,
                    row.total_time,
                    row.total_distance,
                    row.total_elevation,
                    row.total_fuel,
                    row.repeat_count as i64,
                    row.trials as i64,
                    row.confidence,
                    row.route,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_operation(&mut self, row: &OperationRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO operations \
             (idx, from_node, to_node, path_type, manual, low_fuel, waited_hours, \
              departed_day, departed, finished_day, finished, travel_time, distance, \
              fuel_added, fuel_used, fuel_remaining, response_minutes, confidence, route) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            rusqlite::params![
                row.index as i64,
                row.from,
                row.to,
                row.path_type.as_str(),
                row.manual as i64,
                row.low_fuel as i64,
                row.waited_hours,
                row.departed_day,
                row.departed,
                row.finished_day,
                row.finished,
                row.travel_time,
                row.distance,
                row.fuel_added,
                row.fuel_used,
                row.fuel_remaining,
                row.response_minutes,
                row.confidence,
                row.route,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
