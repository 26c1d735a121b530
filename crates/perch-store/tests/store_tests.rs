use std::fs;

use perch_store::{LogStore, Record};
use tempfile::TempDir;

fn record(pairs: &[(&str, &str)]) -> Record {
    let mut r = Record::new();
    for (k, v) in pairs {
        r.push(*k, *v);
    }
    r
}

// ============================================================
// Load tests
// ============================================================

#[test]
fn test_load_all_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());

    assert!(store.load_all("nobody").unwrap().is_empty());
}

#[test]
fn test_load_all_reads_existing_log() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ada.log"), "ID::1\nWORDS::12\n\n").unwrap();

    let store = LogStore::with_dir(dir.path());
    let records = store.load_all("ada").unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("WORDS"), Some("12"));
}

#[test]
fn test_load_all_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());
    store
        .append_record("ada", &record(&[("ID", "1"), ("WORDS", "5")]))
        .unwrap();

    let first = store.load_all("ada").unwrap();
    let second = store.load_all("ada").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_logs_are_per_user() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());
    store.append_record("ada", &record(&[("ID", "1")])).unwrap();

    assert_eq!(store.load_all("ada").unwrap().len(), 1);
    assert!(store.load_all("brendan").unwrap().is_empty());
}

// ============================================================
// Append tests
// ============================================================

#[test]
fn test_append_record_creates_file_and_dir() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path().join("nested").join("logs"));

    store.append_record("ada", &record(&[("ID", "1")])).unwrap();

    assert_eq!(store.load_all("ada").unwrap().len(), 1);
}

#[test]
fn test_append_preserves_order() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());

    for id in 1..=3 {
        store
            .append_record("ada", &record(&[("ID", &id.to_string())]))
            .unwrap();
    }

    let ids: Vec<_> = store
        .load_all("ada")
        .unwrap()
        .iter()
        .map(|r| r.get("ID").unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_append_lines_grows_open_record() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());

    // A clock entry starts with a separator + label + punch-in, then grows.
    store
        .append_lines(
            "ada",
            &[
                String::new(),
                "Mon, Jan 01, 2024".to_string(),
                "P_IN::09:00".to_string(),
            ],
        )
        .unwrap();
    store
        .append_lines("ada", &["B_IN::12:00".to_string()])
        .unwrap();

    let records = store.load_all("ada").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label(), Some("Mon, Jan 01, 2024"));
    assert_eq!(records[0].get("B_IN"), Some("12:00"));
}

#[test]
fn test_append_lines_after_separator_starts_new_record() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());

    store
        .append_lines("ada", &["day one".to_string(), "P_IN::09:00".to_string()])
        .unwrap();
    store
        .append_lines(
            "ada",
            &[
                String::new(),
                "day two".to_string(),
                "P_IN::10:00".to_string(),
            ],
        )
        .unwrap();

    let records = store.load_all("ada").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].label(), Some("day two"));
}

// ============================================================
// Rewrite tests
// ============================================================

#[test]
fn test_rewrite_all_replaces_content_in_order() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());
    store.append_record("ada", &record(&[("ID", "1")])).unwrap();
    store.append_record("ada", &record(&[("ID", "2")])).unwrap();

    let mut updated = store.load_all("ada").unwrap();
    updated[0].push("TAGS", "revised");
    store.rewrite_all("ada", &updated).unwrap();

    let records = store.load_all("ada").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("TAGS"), Some("revised"));
    assert_eq!(records[1].get("ID"), Some("2"));
}

#[test]
fn test_rewrite_all_empty_truncates() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());
    store.append_record("ada", &record(&[("ID", "1")])).unwrap();

    store.rewrite_all("ada", &[]).unwrap();

    assert!(store.load_all("ada").unwrap().is_empty());
}

// ============================================================
// Lock table tests
// ============================================================

#[test]
fn test_user_lock_is_stable_per_user() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_dir(dir.path());

    let a1 = store.user_lock("ada");
    let a2 = store.user_lock("ada");
    let b = store.user_lock("brendan");

    assert!(std::sync::Arc::ptr_eq(&a1, &a2));
    assert!(!std::sync::Arc::ptr_eq(&a1, &b));
}
