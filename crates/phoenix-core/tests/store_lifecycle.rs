//! Store lifecycle against real and failing backends.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use phoenix_core::derive::{LogRange, WarningLevel};
use phoenix_core::error::StorageError;
use phoenix_core::state::{FinanceType, Stage};
use phoenix_core::{
    normalize, Config, CoreError, Database, DocumentKind, ImportError, KeyValueStore,
    SaveOutcome, StateStore, VERSION,
};
use serde_json::{json, Value};

/// Backend whose writes always fail, like a full or read-only disk.
struct FailingBackend;

impl KeyValueStore for FailingBackend {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

fn file_store(path: &std::path::Path) -> StateStore {
    let db = Database::open_at(path).unwrap();
    StateStore::with_backend(Box::new(db), &Config::default()).unwrap()
}

fn record_status(store: &mut StateStore) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.register_status(move |s| sink.borrow_mut().push(s.to_string()));
    seen
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn logbook_days(n: u64) -> Vec<Value> {
    (0..n)
        .map(|i| {
            let date = day("2025-11-07") + chrono::Days::new(i);
            json!({ "date": date.to_string(), "activeMinutes": 60 })
        })
        .collect()
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phoenix.db");

    let mut store = file_store(&path);
    assert!(store.is_durable());
    store.switch_day("2025-11-20").unwrap();
    store.set_active_minutes(95);
    let audit = store.add_audit("makler.example", Stage::Draft).unwrap().id.clone();
    store.set_gate(&audit, "mobil", true).unwrap();
    assert_eq!(store.persist(), SaveOutcome::Saved);
    drop(store);

    let store = file_store(&path);
    assert_eq!(store.state().daily.date, "2025-11-20");
    assert_eq!(store.state().daily.active_minutes, 95);
    assert_eq!(store.state().audits[0].gate_score, 14);
}

#[test]
fn unopenable_database_falls_back_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("PHOENIX_DATA_DIR", dir.path());
    let mut config = Config::default();
    config.storage.database = "missing/phoenix.db".into();

    let mut store = StateStore::open(&config).unwrap();
    assert!(!store.is_durable());
    assert_eq!(store.state().home.mit.len(), 3);
    store.set_active_minutes(30);
    assert_eq!(store.persist(), SaveOutcome::Saved);
    assert_eq!(store.state().daily.active_minutes, 30);
}

#[test]
fn write_failure_reports_and_keeps_memory_state() {
    let mut store = StateStore::with_backend(Box::new(FailingBackend), &Config::default()).unwrap();
    let seen = record_status(&mut store);
    store.add_mit("ship the audit").unwrap();

    assert_eq!(store.persist(), SaveOutcome::Failed);
    assert!(!store.flush_status());
    assert_eq!(*seen.borrow(), vec!["save failed"]);
    assert!(store.state().home.mit.iter().any(|m| m.text == "ship the audit"));
}

#[test]
fn malformed_import_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = file_store(&dir.path().join("phoenix.db"));
    store
        .add_finance(Some("2025-11-08"), FinanceType::Income, 250.0, "")
        .unwrap();
    let before = store.state().clone();

    let err = store.import_str("{\"logbook\": [").unwrap_err();
    assert!(matches!(err, CoreError::Import(ImportError::Parse(_))));
    let err = store.import_str("\"just a string\"").unwrap_err();
    assert!(matches!(err, CoreError::Import(ImportError::NotAnObject)));
    assert_eq!(store.state(), &before);
}

#[test]
fn export_round_trips_through_normalize() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = file_store(&dir.path().join("phoenix.db"));
    store.switch_day("2025-12-01").unwrap();
    store.set_active_minutes(120);
    store
        .add_finance(Some("2025-12-01"), FinanceType::Expense, 19.99, "hosting")
        .unwrap();
    store.add_outreach("Ben", "Mail", "", "intro").unwrap();

    let exported = store.export().unwrap();
    let raw: Value = serde_json::from_str(&exported).unwrap();
    let reloaded = normalize(&raw, store.window());
    assert_eq!(&reloaded, store.state());
    assert!(reloaded.logbook.iter().any(|l| l.date == "2025-12-01"));
    assert_eq!(reloaded.finances.entries[0].amount, 19.99);
}

#[test]
fn import_replaces_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phoenix.db");
    let mut store = file_store(&path);
    let seen = record_status(&mut store);

    let backup = json!({
        "version": "11.0",
        "activeTab": "outreach",
        "logbook": logbook_days(3),
        "futureField": {"kept": true}
    });
    store.import_str(&backup.to_string()).unwrap();
    assert_eq!(seen.borrow().last().map(String::as_str), Some("import ok"));
    drop(store);

    let store = file_store(&path);
    assert_eq!(store.state().version, VERSION);
    assert_eq!(store.state().logbook.len(), 3);
    assert_eq!(store.state().extra["futureField"], json!({"kept": true}));
}

#[test]
fn warnings_follow_journal_depth() {
    let mut store = StateStore::with_backend(Box::new(FailingBackend), &Config::default()).unwrap();
    let today = day("2026-01-20");

    store
        .import_value(json!({ "logbook": logbook_days(10) }))
        .unwrap();
    let warnings = store.evaluate_warnings(today);
    assert_eq!(warnings[0].level, WarningLevel::Warn);
    assert!(!store.state().phoenix.zeitjournal_stable);

    store
        .import_value(json!({ "logbook": logbook_days(65) }))
        .unwrap();
    let warnings = store.evaluate_warnings(today);
    assert!(warnings.iter().all(|w| !w.text.contains("Time journal")));
    assert!(store.state().phoenix.zeitjournal_stable);
}

#[test]
fn generating_archives_the_current_day() {
    let mut store = StateStore::with_backend(Box::new(FailingBackend), &Config::default()).unwrap();
    store.switch_day("2025-12-02").unwrap();
    store.set_active_minutes(45);
    // only the day that was active before the switch
    assert_eq!(store.state().logbook.len(), 1);

    let doc = store.generate(DocumentKind::Protocol(LogRange::All), day("2025-12-02"));
    assert_eq!(store.state().logbook.len(), 2);
    assert!(doc.body.contains("Date: 2025-12-02"));
    assert!(doc.body.contains("Work-like time: 45 min"));
}
