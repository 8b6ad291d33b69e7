//! Integration tests for mcr-output.

use mcr_core::{PathType, SimConfig};
use mcr_decision::ProbabilisticModel;
use mcr_network::{DijkstraOracle, GraphBuilder, NodeAttrs};
use mcr_sim::{Sim, SimBuilder};

use crate::{OperationRow, PathMatrixRow};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Depot ── Mill ── Quay, three trials, no frequency data.
fn small_sim() -> Sim<ProbabilisticModel, DijkstraOracle> {
    let mut b = GraphBuilder::new();
    let depot = b.add_node("Depot", NodeAttrs::at(0.0, 0.0));
    let mill  = b.add_node("Mill",  NodeAttrs::at(1.0, 0.0));
    let quay  = b.add_node("Quay",  NodeAttrs::at(2.0, 0.0));
    b.add_road(depot, mill, vec![60.0, 70.0]);
    b.add_road(mill, quay, vec![30.0, 40.0]);
    let config = SimConfig { trials: 3, station: "Depot".into(), ..SimConfig::default() };
    SimBuilder::new(b.build().unwrap(), config, ProbabilisticModel, DijkstraOracle)
        .build()
        .unwrap()
}

fn matrix_row(from: &str, to: &str) -> PathMatrixRow {
    PathMatrixRow {
        path_type:       PathType::Quickest,
        from:            from.into(),
        to:              to.into(),
        weight:          2.5,
        total_time:      90.0,
        total_distance:  2.0,
        total_elevation: 0.0,
        total_fuel:      0.2,
        repeat_count:    3,
        trials:          4,
        confidence:      0.75,
        route:           format!("{from} > {to}"),
    }
}

fn operation_row(index: usize) -> OperationRow {
    OperationRow {
        index,
        from:             "Depot".into(),
        to:               "Quay".into(),
        path_type:        PathType::FuelEfficient,
        manual:           false,
        low_fuel:         true,
        waited_hours:     2,
        departed_day:     0,
        departed:         "14:00".into(),
        finished_day:     0,
        finished:         "14:12".into(),
        travel_time:      100.0,
        distance:         2.0,
        fuel_added:       0.0,
        fuel_used:        0.3,
        fuel_remaining:   9.7,
        response_minutes: 10.3,
        confidence:       1.0,
        route:            "Depot > Mill > Quay".into(),
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use super::*;
    use crate::{matrix_rows, render_route};

    #[test]
    fn matrix_rows_cover_every_pair_by_name() {
        let sim = small_sim();
        let rows = matrix_rows(sim.graph(), sim.quickest());
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|r| r.path_type == PathType::Quickest && r.trials == 3));

        let row = rows.iter().find(|r| r.from == "Depot" && r.to == "Quay").unwrap();
        assert_eq!(row.route, "Depot > Mill > Quay");
        assert!(row.confidence > 0.0 && row.confidence <= 1.0);

        let diagonal = rows.iter().find(|r| r.from == "Mill" && r.to == "Mill").unwrap();
        assert_eq!(diagonal.route, "Mill");
        assert_eq!(diagonal.total_time, 0.0);
    }

    #[test]
    fn operation_row_uses_report_values() {
        let mut sim = small_sim();
        let quay = sim.graph().node_id("Quay").unwrap();
        let report = sim.run_operation(&mut mcr_sim::NoopObserver, Some(quay)).unwrap();
        let row = OperationRow::new(sim.graph(), &report);
        assert_eq!((row.from.as_str(), row.to.as_str()), ("Depot", "Quay"));
        assert_eq!(row.route, render_route(sim.graph(), &report.route));
        assert_eq!(row.travel_time, report.route.total_time);
        assert_eq!(row.departed, report.departed.to_string());
        assert!(row.manual);
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::{CsvWriter, MATRIX_HEADER, OPERATIONS_HEADER};
    use crate::writer::OutputWriter;
    use crate::SimOutputObserver;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read(dir: &TempDir, file: &str) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("path_matrix.csv").exists());
        assert!(dir.path().join("operations.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (headers, rows) = read(&dir, "path_matrix.csv");
        assert_eq!(headers, MATRIX_HEADER);
        assert!(rows.is_empty());

        let (headers, _) = read(&dir, "operations.csv");
        assert_eq!(headers, OPERATIONS_HEADER);
    }

    #[test]
    fn csv_matrix_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_matrix(&[matrix_row("A", "B"), matrix_row("B", "A")]).unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, "path_matrix.csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "quickest");
        assert_eq!(&rows[0][1], "A");
        assert_eq!(&rows[0][2], "B");
        assert_eq!(&rows[0][8], "3");     // repeat_count
        assert_eq!(&rows[0][10], "0.75"); // confidence
        assert_eq!(&rows[1][11], "B > A");
    }

    #[test]
    fn csv_operation_flags_as_integers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_operation(&operation_row(7)).unwrap();
        w.finish().unwrap();

        let (_, rows) = read(&dir, "operations.csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "7");
        assert_eq!(&rows[0][3], "fuel_efficient");
        assert_eq!(&rows[0][4], "0"); // manual
        assert_eq!(&rows[0][5], "1"); // low_fuel
        assert_eq!(&rows[0][8], "14:00");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn integration_csv() {
        let dir = tmp();
        let mut sim = small_sim();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        obs.write_matrix(sim.graph(), sim.quickest()).unwrap();
        obs.write_matrix(sim.graph(), sim.fuel_efficient()).unwrap();

        for name in ["Quay", "Mill", "Depot"] {
            let to = sim.graph().node_id(name).unwrap();
            sim.run_operation(&mut obs, Some(to)).unwrap();
        }
        obs.finish().unwrap();
        assert!(obs.take_error().is_none());
        assert_eq!(obs.written(), 3);

        let (_, matrix) = read(&dir, "path_matrix.csv");
        assert_eq!(matrix.len(), 18);
        assert_eq!(matrix.iter().filter(|r| &r[0] == "fuel_efficient").count(), 9);

        let (_, ops) = read(&dir, "operations.csv");
        let hops: Vec<(&str, &str)> = ops.iter().map(|r| (&r[1], &r[2])).collect();
        assert_eq!(hops, [("Depot", "Quay"), ("Quay", "Mill"), ("Mill", "Depot")]);
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_matrix_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_matrix(&[matrix_row("A", "B"), matrix_row("B", "A"), matrix_row("A", "A")]).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM path_matrix", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn sqlite_operation_stored() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_operation(&operation_row(4)).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (idx, path_type, low_fuel, route): (i64, String, i64, String) = conn
            .query_row(
                "SELECT idx, path_type, low_fuel, route FROM operations",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(idx, 4);
        assert_eq!(path_type, "fuel_efficient");
        assert_eq!(low_fuel, 1);
        assert_eq!(route, "Depot > Mill > Quay");
    }
}
