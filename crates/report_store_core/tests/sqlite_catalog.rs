use report_store_core::db::open_db_in_memory;
use report_store_core::{
    RepoError, ReportRepository, ReportSummary, SqliteReportRepository, UpsertOutcome,
};

#[test]
fn upsert_creates_then_updates_in_place() {
    let repo = SqliteReportRepository::open_in_memory().unwrap();

    assert_eq!(
        repo.upsert_layout("Invoice", b"v1").unwrap(),
        UpsertOutcome::Created
    );
    assert_eq!(
        repo.upsert_layout("Invoice", b"v2").unwrap(),
        UpsertOutcome::Updated
    );

    let record = repo.find_report("Invoice").unwrap().unwrap();
    assert_eq!(record.name, "Invoice");
    assert_eq!(record.display_name, "Invoice");
    assert_eq!(record.layout_data, b"v2");
    assert_eq!(repo.list_reports().unwrap().len(), 1);
}

#[test]
fn update_keeps_display_name() {
    let repo = SqliteReportRepository::open_in_memory().unwrap();
    repo.upsert_layout("Invoice", b"v1").unwrap();
    repo.set_display_name("Invoice", "Monthly invoices").unwrap();

    repo.upsert_layout("Invoice", b"v2").unwrap();

    let record = repo.find_report("Invoice").unwrap().unwrap();
    assert_eq!(record.display_name, "Monthly invoices");
    assert_eq!(record.layout_data, b"v2");
}

#[test]
fn find_missing_report_returns_none() {
    let repo = SqliteReportRepository::open_in_memory().unwrap();
    assert!(repo.find_report("missing").unwrap().is_none());
    assert!(!repo.contains_report("missing").unwrap());
}

#[test]
fn lookups_are_exact_match() {
    let repo = SqliteReportRepository::open_in_memory().unwrap();
    repo.upsert_layout("Invoice", b"v1").unwrap();

    assert!(repo.find_report("invoice").unwrap().is_none());
    assert!(repo.find_report("Invoice%").unwrap().is_none());
}

#[test]
fn insert_layout_never_overwrites() {
    let repo = SqliteReportRepository::open_in_memory().unwrap();

    assert!(repo.insert_layout("Draft", b"first").unwrap());
    assert!(!repo.insert_layout("Draft", b"second").unwrap());
    assert_eq!(
        repo.find_report("Draft").unwrap().unwrap().layout_data,
        b"first"
    );
}

#[test]
fn set_display_name_on_missing_report_is_not_found() {
    let repo = SqliteReportRepository::open_in_memory().unwrap();
    let err = repo.set_display_name("ghost", "Ghost").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(name) if name == "ghost"));
}

#[test]
fn list_reports_is_sorted_by_name() {
    let repo = SqliteReportRepository::open_in_memory().unwrap();
    for name in ["b", "c", "a"] {
        repo.upsert_layout(name, b"{}").unwrap();
    }
    repo.set_display_name("c", "Charlie").unwrap();

    assert_eq!(
        repo.list_reports().unwrap(),
        vec![
            ReportSummary {
                name: "a".to_string(),
                display_name: "a".to_string()
            },
            ReportSummary {
                name: "b".to_string(),
                display_name: "b".to_string()
            },
            ReportSummary {
                name: "c".to_string(),
                display_name: "Charlie".to_string()
            },
        ]
    );
}

#[test]
fn failed_update_rolls_back_to_previous_bytes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_oversized BEFORE UPDATE ON reports
         WHEN length(NEW.layout_data) > 8
         BEGIN
             SELECT RAISE(ABORT, 'layout too large');
         END;",
    )
    .unwrap();
    let repo = SqliteReportRepository::new(conn);
    repo.upsert_layout("Invoice", b"small").unwrap();

    let err = repo
        .upsert_layout("Invoice", b"much too large")
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let record = repo.find_report("Invoice").unwrap().unwrap();
    assert_eq!(record.layout_data, b"small");
    assert_eq!(repo.list_reports().unwrap().len(), 1);
}

#[test]
fn file_catalog_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.db");

    {
        let repo = SqliteReportRepository::open(&path).unwrap();
        repo.upsert_layout("Kept", b"payload").unwrap();
    }

    let repo = SqliteReportRepository::open(&path).unwrap();
    assert_eq!(
        repo.find_report("Kept").unwrap().unwrap().layout_data,
        b"payload"
    );
}
