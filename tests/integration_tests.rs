//! End-to-end integration tests
//!
//! Covers the full insert → index → select → lose-page → recover lifecycle
//! through the public `Database` API, plus engine-level policies (arity
//! check, duplicate tables, traces, reset, reopen).

use foliodb::{ArityCheck, Config, Database, FolioError, PageCapacity, Tuple};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_db(temp: &TempDir) -> Database {
    let config = Config::builder().data_dir(temp.path()).build();
    Database::open(config).unwrap()
}

fn t(fields: &[&str]) -> Tuple {
    fields.iter().map(|f| f.to_string()).collect()
}

// =============================================================================
// The Canonical Scenario
// =============================================================================

#[test]
fn test_full_lifecycle_scenario() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);

    // Create table t [id, major] with page capacity 2 and insert 3 rows.
    db.create_table_with_capacity("t", PageCapacity::Bounded(2), &["id", "major"])
        .unwrap();
    let o1 = db.insert("t", t(&["1", "CS"])).unwrap();
    let o2 = db.insert("t", t(&["2", "BI"])).unwrap();
    let o3 = db.insert("t", t(&["3", "CS"])).unwrap();
    assert_eq!((o1.page_number, o1.global_index), (0, 0));
    assert_eq!((o2.page_number, o2.global_index), (0, 1));
    assert_eq!((o3.page_number, o3.global_index), (1, 2));
    assert!(o1.is_clean() && o2.is_clean() && o3.is_clean());

    // Two pages: [("1","CS"),("2","BI")] and [("3","CS")].
    assert_eq!(db.select_at("t", 0, 0).unwrap(), Some(t(&["1", "CS"])));
    assert_eq!(db.select_at("t", 0, 1).unwrap(), Some(t(&["2", "BI"])));
    assert_eq!(db.select_at("t", 1, 0).unwrap(), Some(t(&["3", "CS"])));
    assert_eq!(db.select_at("t", 1, 1).unwrap(), None);

    // Index on major: CS occurs at global indices {0, 2} → "101".
    db.create_index("t", "major").unwrap();
    assert_eq!(db.bits_for_value("t", "major", "CS").unwrap(), "101");
    assert_eq!(db.bits_for_value("t", "major", "BI").unwrap(), "010");

    // Planner select, all-indexed case, in global order.
    let selection = db.select_where("t", &["major"], &["CS"]).unwrap();
    assert_eq!(selection.report.path, "all-indexed");
    assert_eq!(selection.tuples, vec![t(&["1", "CS"]), t(&["3", "CS"])]);

    // Lose page 0 out-of-band; validate reports its tuples at risk.
    db.backend().delete_page("t", 0).unwrap();
    let report = db.validate("t").unwrap();
    assert_eq!(report.missing_pages, vec![0]);
    assert_eq!(report.at_risk, vec![t(&["1", "CS"]), t(&["2", "BI"])]);

    // Recover and address through the regenerated page again.
    let recovery = db.recover("t").unwrap();
    assert_eq!(recovery.restored_pages, vec![0]);
    assert_eq!(db.tuple_at("t", 0).unwrap(), t(&["1", "CS"]));
}

// =============================================================================
// Incremental Index Maintenance
// =============================================================================

#[test]
fn test_index_stays_consistent_across_inserts() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table_with_capacity("t", PageCapacity::Bounded(2), &["id", "major"])
        .unwrap();

    // Index built on an empty table, then maintained insert by insert.
    db.create_index("t", "major").unwrap();
    for row in [["1", "CS"], ["2", "BI"], ["3", "CS"], ["4", "BI"]] {
        db.insert("t", t(&row)).unwrap();
    }
    assert_eq!(db.bits_for_value("t", "major", "CS").unwrap(), "1010");

    // Same contents as a fresh build over the same rows.
    let temp2 = TempDir::new().unwrap();
    let db2 = open_db(&temp2);
    db2.create_table_with_capacity("t", PageCapacity::Bounded(2), &["id", "major"])
        .unwrap();
    for row in [["1", "CS"], ["2", "BI"], ["3", "CS"], ["4", "BI"]] {
        db2.insert("t", t(&row)).unwrap();
    }
    db2.create_index("t", "major").unwrap();
    for value in ["CS", "BI", "LAW"] {
        assert_eq!(
            db.bits_for_value("t", "major", value).unwrap(),
            db2.bits_for_value("t", "major", value).unwrap()
        );
    }
}

#[test]
fn test_stale_bits_render_against_current_row_count() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table("t", &["id", "major"]).unwrap();
    db.insert("t", t(&["1", "CS"])).unwrap();
    db.create_index("t", "major").unwrap();
    db.create_index("t", "id").unwrap();

    // Another insert is reflected by both indexes immediately.
    db.insert("t", t(&["2", "BI"])).unwrap();
    assert_eq!(db.bits_for_value("t", "major", "CS").unwrap(), "10");
    assert_eq!(db.bits_for_value("t", "major", "BI").unwrap(), "01");
    assert_eq!(db.bits_for_value("t", "id", "2").unwrap(), "01");
}

// =============================================================================
// Engine Policies
// =============================================================================

#[test]
fn test_duplicate_table_rejected() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table("t", &["id"]).unwrap();
    let err = db.create_table("t", &["id"]).unwrap_err();
    assert!(matches!(err, FolioError::TableExists(_)));
}

#[test]
fn test_insert_into_missing_table() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    let err = db.insert("ghost", t(&["1"])).unwrap_err();
    assert!(matches!(err, FolioError::TableNotFound(_)));
}

#[test]
fn test_arity_enforcement_is_opt_in() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .arity_check(ArityCheck::Enforce)
        .build();
    let db = Database::open(config).unwrap();
    db.create_table("t", &["id", "major"]).unwrap();

    let err = db.insert("t", t(&["1"])).unwrap_err();
    assert!(matches!(
        err,
        FolioError::ArityMismatch { expected: 2, got: 1 }
    ));
    db.insert("t", t(&["1", "CS"])).unwrap();
}

#[test]
fn test_default_arity_policy_passes_mismatches_through() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table("t", &["id", "major"]).unwrap();

    db.insert("t", t(&["1"])).unwrap();
    db.insert("t", t(&["2", "CS", "extra"])).unwrap();
    assert_eq!(db.select_all("t").unwrap().len(), 2);
}

#[test]
fn test_zero_capacity_rejected_before_persist() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);

    let err = db
        .create_table_with_capacity("z", PageCapacity::Bounded(0), &["id"])
        .unwrap_err();
    assert!(matches!(err, FolioError::InvalidSchema(_)));

    // Nothing was persisted, so lookups report a missing table instead of
    // dividing by the zero bound.
    assert!(matches!(
        db.select_all("z").unwrap_err(),
        FolioError::TableNotFound(_)
    ));
    assert!(matches!(
        db.tuple_at("z", 0).unwrap_err(),
        FolioError::TableNotFound(_)
    ));
}

#[test]
fn test_unbounded_capacity_single_page() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table_with_capacity("t", PageCapacity::Unbounded, &["n"])
        .unwrap();
    for i in 0..25 {
        let outcome = db.insert("t", t(&[&i.to_string()])).unwrap();
        assert_eq!(outcome.page_number, 0);
        assert_eq!(outcome.global_index, i);
    }
    assert_eq!(db.tuple_at("t", 24).unwrap(), t(&["24"]));
}

#[test]
fn test_duplicate_index_build_duplicates_registry_entry() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table("t", &["id", "major"]).unwrap();
    db.insert("t", t(&["1", "CS"])).unwrap();

    db.create_index("t", "major").unwrap();
    db.create_index("t", "major").unwrap();
    assert_eq!(db.indexed_columns("t"), vec!["major", "major"]);

    // Queries still classify and answer correctly.
    let selection = db.select_where("t", &["major"], &["CS"]).unwrap();
    assert_eq!(selection.report.path, "all-indexed");
    assert_eq!(selection.tuples.len(), 1);
}

// =============================================================================
// Traces
// =============================================================================

#[test]
fn test_traces_accumulate_per_operation() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table("student", &["id", "major"]).unwrap();
    db.insert("student", t(&["1", "CS"])).unwrap();
    db.create_index("student", "major").unwrap();
    db.select_where("student", &["major"], &["CS"]).unwrap();

    let full = db.full_trace("student");
    let lines: Vec<&str> = full.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Created table with columns: id, major"));
    assert!(lines[1].contains("Inserted: [1, CS], page: 0"));
    assert!(lines[2].contains("Built bitmap index on 'major'"));
    assert!(lines[3].contains("via all-indexed"));

    assert_eq!(db.last_trace("student"), lines[3]);
}

#[test]
fn test_lookups_emit_trace_entries() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table("t", &["id", "major"]).unwrap();
    db.insert("t", t(&["1", "CS"])).unwrap();
    db.create_index("t", "major").unwrap();

    db.tuple_at("t", 0).unwrap();
    assert_eq!(db.last_trace("t"), "Fetched global index 0: hit");

    db.tuple_at("t", 9).unwrap_err();
    assert_eq!(db.last_trace("t"), "Fetched global index 9: miss");

    db.bits_for_value("t", "major", "CS").unwrap();
    assert_eq!(
        db.last_trace("t"),
        "Rendered bitmap of 'CS' on 'major' over 1 rows"
    );
}

#[test]
fn test_trace_for_unknown_table() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    assert_eq!(db.full_trace("ghost"), "No traces found for table ghost");
    assert_eq!(db.last_trace("ghost"), "No traces found for table ghost");
}

// =============================================================================
// Reset & Reopen
// =============================================================================

#[test]
fn test_reset_clears_durable_state() {
    let temp = TempDir::new().unwrap();
    let db = open_db(&temp);
    db.create_table("t", &["id"]).unwrap();
    db.insert("t", t(&["1"])).unwrap();

    db.reset().unwrap();
    assert_eq!(db.backend_trace().unwrap(), "<empty>");
    assert!(matches!(
        db.select_all("t").unwrap_err(),
        FolioError::TableNotFound(_)
    ));
    // The name is free again.
    db.create_table("t", &["id"]).unwrap();
}

#[test]
fn test_reopen_rebuilds_index_registry() {
    let temp = TempDir::new().unwrap();
    {
        let db = open_db(&temp);
        db.create_table("t", &["id", "major"]).unwrap();
        db.insert("t", t(&["1", "CS"])).unwrap();
        db.create_index("t", "major").unwrap();
    }

    let db = open_db(&temp);
    assert_eq!(db.indexed_columns("t"), vec!["major"]);

    // The reopened instance still plans through the index.
    let selection = db.select_where("t", &["major"], &["CS"]).unwrap();
    assert_eq!(selection.report.path, "all-indexed");
    assert_eq!(selection.tuples, vec![t(&["1", "CS"])]);

    // And keeps maintaining it on insert.
    db.insert("t", t(&["2", "CS"])).unwrap();
    assert_eq!(db.bits_for_value("t", "major", "CS").unwrap(), "11");
}
