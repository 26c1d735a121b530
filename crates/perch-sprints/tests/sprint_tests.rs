use std::fs;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use perch_sprints::{ProgressRange, Sprint, SprintError, SprintStore};
use tempfile::TempDir;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn sprint(id: i64, timestamp: &str, tags: &[&str], content: &str) -> Sprint {
    Sprint {
        id,
        timestamp: ts(timestamp),
        word_count: 320,
        wpm: 21.33,
        duration: "15:00".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        content: Some(content.to_string()),
    }
}

// ============================================================
// Create / list
// ============================================================

#[test]
fn test_list_with_no_history_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());

    assert!(store.list("ada").unwrap().is_empty());
}

#[test]
fn test_create_then_list_round_trips_metadata() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());

    store
        .create("ada", sprint(1, "2024-01-01T10:30:00Z", &["draft"], "words"))
        .unwrap();

    let sprints = store.list("ada").unwrap();
    assert_eq!(sprints.len(), 1);
    assert_eq!(sprints[0].id, 1);
    assert_eq!(sprints[0].timestamp, ts("2024-01-01T10:30:00Z"));
    assert_eq!(sprints[0].word_count, 320);
    assert_eq!(sprints[0].wpm, 21.33);
    assert_eq!(sprints[0].duration, "15:00");
    assert_eq!(sprints[0].tags, vec!["draft".to_string()]);
    // Content is never part of the metadata log.
    assert!(sprints[0].content.is_none());
}

#[test]
fn test_create_preserves_append_order() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());

    for id in 1..=3 {
        let timestamp = format!("2024-01-0{id}T10:00:00Z");
        store
            .create("ada", sprint(id, &timestamp, &[], ""))
            .unwrap();
    }

    let ids: Vec<i64> = store.list("ada").unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_tags_with_commas_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());

    store
        .create("ada", sprint(1, "2024-01-01T10:00:00Z", &["a,b", "c"], ""))
        .unwrap();

    // On disk the list is escaped; decoded it comes back intact.
    let raw = fs::read_to_string(dir.path().join("ada.log")).unwrap();
    assert!(raw.contains("TAGS::a\\,b,c"));

    let sprints = store.list("ada").unwrap();
    assert_eq!(sprints[0].tags, vec!["a,b".to_string(), "c".to_string()]);
}

#[test]
fn test_sprints_are_per_user() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());

    store
        .create("ada", sprint(1, "2024-01-01T10:00:00Z", &[], ""))
        .unwrap();

    assert_eq!(store.list("ada").unwrap().len(), 1);
    assert!(store.list("brendan").unwrap().is_empty());
}

// ============================================================
// Content
// ============================================================

#[test]
fn test_content_stored_apart_from_metadata() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());

    store
        .create(
            "ada",
            sprint(7, "2024-01-01T10:00:00Z", &[], "the quick brown fox"),
        )
        .unwrap();

    let raw = fs::read_to_string(dir.path().join("ada.log")).unwrap();
    assert!(!raw.contains("the quick brown fox"));
    assert_eq!(store.content("ada", 7).unwrap(), "the quick brown fox");
}

#[test]
fn test_content_unknown_sprint_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());

    let err = store.content("ada", 99).unwrap_err();
    assert!(matches!(err, SprintError::NotFound(99)));
}

// ============================================================
// Tag updates
// ============================================================

#[test]
fn test_update_tags_rewrites_in_place() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());
    store
        .create("ada", sprint(1, "2024-01-01T10:00:00Z", &["old"], "one"))
        .unwrap();
    store
        .create("ada", sprint(2, "2024-01-02T10:00:00Z", &[], "two"))
        .unwrap();

    store
        .update_tags("ada", 1, vec!["new".to_string(), "with,comma".to_string()])
        .unwrap();

    let sprints = store.list("ada").unwrap();
    assert_eq!(sprints.len(), 2);
    assert_eq!(
        sprints[0].tags,
        vec!["new".to_string(), "with,comma".to_string()]
    );
    // The rest of the record and the order survive the rewrite.
    assert_eq!(sprints[0].timestamp, ts("2024-01-01T10:00:00Z"));
    assert_eq!(sprints[1].id, 2);
    assert!(sprints[1].tags.is_empty());
}

#[test]
fn test_update_tags_unknown_sprint_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());
    store
        .create("ada", sprint(1, "2024-01-01T10:00:00Z", &[], ""))
        .unwrap();

    let err = store
        .update_tags("ada", 42, vec!["x".to_string()])
        .unwrap_err();

    assert!(matches!(err, SprintError::NotFound(42)));
    // A failed update leaves the log alone.
    assert_eq!(store.list("ada").unwrap().len(), 1);
}

#[test]
fn test_update_tags_does_not_touch_content() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());
    store
        .create("ada", sprint(1, "2024-01-01T10:00:00Z", &[], "precious"))
        .unwrap();

    store.update_tags("ada", 1, vec!["t".to_string()]).unwrap();

    assert_eq!(store.content("ada", 1).unwrap(), "precious");
}

// ============================================================
// Analytics entry points
// ============================================================

#[test]
fn test_longest_streak_from_store() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());
    for (id, day) in [(1, "01"), (2, "02"), (3, "04")] {
        let timestamp = format!("2024-01-{day}T10:00:00Z");
        store
            .create("ada", sprint(id, &timestamp, &[], ""))
            .unwrap();
    }

    assert_eq!(store.longest_streak("ada", Tz::UTC).unwrap(), 2);
}

#[test]
fn test_progress_total_from_store() {
    let dir = TempDir::new().unwrap();
    let store = SprintStore::with_dir(dir.path());
    store
        .create("ada", sprint(1, "2024-01-01T10:00:00Z", &[], ""))
        .unwrap();

    let stats = store
        .progress("ada", ProgressRange::Total, Tz::UTC)
        .unwrap();

    assert_eq!(stats.word_count, 320);
    assert_eq!(stats.minutes_written, 15.0);
}

// ============================================================
// JSON contract
// ============================================================

#[test]
fn test_sprint_json_shape() {
    let mut s = sprint(5, "2024-01-01T10:00:00Z", &["tag"], "");
    s.content = None;

    let json = serde_json::to_value(&s).unwrap();

    assert_eq!(json["id"], 5);
    assert_eq!(json["wordCount"], 320);
    assert_eq!(json["wpm"], 21.33);
    assert_eq!(json["duration"], "15:00");
    assert_eq!(json["tags"][0], "tag");
    // Absent content is omitted entirely, not serialized as null.
    assert!(json.get("content").is_none());
}

#[test]
fn test_sprint_json_accepts_missing_optional_fields() {
    let s: Sprint = serde_json::from_str(
        r#"{"id":1,"timestamp":"2024-01-01T10:00:00Z","wordCount":10,"wpm":5.0,"duration":"2:00"}"#,
    )
    .unwrap();

    assert!(s.tags.is_empty());
    assert!(s.content.is_none());
}
