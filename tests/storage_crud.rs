//! Store CRUD tests with real `SQLite` (no mocks).
//!
//! Covers `add` defaults and id assignment, `get` misses, and `update`
//! partial-validation semantics.

mod common;

use chrono::Duration;
use common::{fixtures, test_db, test_db_with_dir};
use trackd::error::TrackerError;
use trackd::model::{DEFAULT_EFFORT, DESCRIPTION_PLACEHOLDER, IssuePatch, Status};

// ============================================================================
// ADD
// ============================================================================

#[test]
fn add_assigns_sequential_ids() {
    let mut store = test_db();

    let first = store.add(fixtures::input("first issue")).unwrap();
    let second = store.add(fixtures::input("second issue")).unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
}

#[test]
fn add_fills_defaults() {
    let mut store = test_db();

    let issue = store.add(fixtures::input("defaulted")).unwrap();

    assert_eq!(issue.status, Status::New);
    assert!(issue.owner.is_none());
    assert_eq!(issue.effort, DEFAULT_EFFORT);
    assert_eq!(issue.due, issue.created + Duration::days(10));
    assert_eq!(issue.description, DESCRIPTION_PLACEHOLDER);
}

#[test]
fn add_honors_explicit_id_without_consuming_sequence() {
    let mut store = test_db();

    let explicit = store
        .add(trackd::model::IssueInput {
            id: Some(50),
            ..fixtures::input("explicit id")
        })
        .unwrap();
    assert_eq!(explicit.id, 50);

    // The sequence was not consulted for the explicit id.
    let sequenced = store.add(fixtures::input("sequenced")).unwrap();
    assert_eq!(sequenced.id, 1);
}

#[test]
fn add_rejects_duplicate_id() {
    let mut store = test_db();
    store
        .add(trackd::model::IssueInput {
            id: Some(7),
            ..fixtures::input("original")
        })
        .unwrap();

    let err = store
        .add(trackd::model::IssueInput {
            id: Some(7),
            ..fixtures::input("duplicate")
        })
        .unwrap_err();
    assert!(matches!(err, TrackerError::Database(_)));
    assert_eq!(store.count_active().unwrap(), 1);
}

#[test]
fn add_collects_all_validation_errors() {
    let mut store = test_db();

    let err = store
        .add(trackd::model::IssueInput {
            title: "ab".to_string(),
            status: Some(Status::Assigned),
            ..trackd::model::IssueInput::default()
        })
        .unwrap_err();

    let TrackerError::Validation { errors } = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(store.count_active().unwrap(), 0);
}

#[test]
fn add_fails_fatally_when_counter_row_is_missing() {
    let (mut store, dir) = test_db_with_dir();
    let db_path = dir.path().join("trackd.db");

    // Simulate a corrupted counters collection from the outside.
    let raw = rusqlite::Connection::open(&db_path).unwrap();
    raw.execute("DELETE FROM counters WHERE name = 'issues'", [])
        .unwrap();
    drop(raw);

    let err = store.add(fixtures::input("doomed")).unwrap_err();
    assert!(matches!(err, TrackerError::Sequence { ref name } if name == "issues"));
    assert_eq!(store.count_active().unwrap(), 0);
}

// ============================================================================
// GET
// ============================================================================

#[test]
fn get_miss_is_none_not_error() {
    let store = test_db();
    assert!(store.get(12345).unwrap().is_none());
}

#[test]
fn get_returns_persisted_record() {
    let mut store = test_db();
    let added = store.add(fixtures::assigned("owned issue", "ali")).unwrap();

    let fetched = store.get(added.id).unwrap().expect("issue exists");
    assert_eq!(fetched, added);
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn update_patches_and_rereads() {
    let mut store = test_db();
    let added = store.add(fixtures::input("patchable")).unwrap();

    let patch = IssuePatch {
        title: Some("patched title".to_string()),
        effort: Some(3),
        ..IssuePatch::default()
    };
    let updated = store.update(added.id, &patch).unwrap();

    assert_eq!(updated.title, "patched title");
    assert_eq!(updated.effort, 3);
    assert_eq!(updated.created, added.created);
    assert_eq!(store.get(added.id).unwrap().unwrap(), updated);
}

#[test]
fn update_missing_id_is_an_error() {
    let mut store = test_db();
    let patch = IssuePatch {
        effort: Some(1),
        ..IssuePatch::default()
    };
    let err = store.update(999, &patch).unwrap_err();
    assert!(matches!(err, TrackerError::Update { id: 999 }));
}

#[test]
fn update_validates_merged_record_when_status_touched() {
    let mut store = test_db();
    let added = store.add(fixtures::input("no owner yet")).unwrap();

    // Status -> Assigned with no owner anywhere must fail.
    let patch = IssuePatch {
        status: Some(Status::Assigned),
        ..IssuePatch::default()
    };
    let err = store.update(added.id, &patch).unwrap_err();
    let TrackerError::Validation { errors } = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors[0].field, "owner");

    // Record unchanged.
    assert_eq!(store.get(added.id).unwrap().unwrap().status, Status::New);
}

#[test]
fn update_status_alone_passes_when_stored_owner_exists() {
    let mut store = test_db();
    let added = store.add(fixtures::input("has owner soon")).unwrap();
    store
        .update(
            added.id,
            &IssuePatch {
                owner: Some(Some("sara".to_string())),
                ..IssuePatch::default()
            },
        )
        .unwrap();

    // Merged-record semantics: the stored owner satisfies the invariant.
    let updated = store
        .update(
            added.id,
            &IssuePatch {
                status: Some(Status::Assigned),
                ..IssuePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.status, Status::Assigned);
    assert_eq!(updated.owner.as_deref(), Some("sara"));
}

#[test]
fn update_clearing_owner_of_assigned_issue_fails() {
    let mut store = test_db();
    let added = store.add(fixtures::assigned("owned", "ali")).unwrap();

    let err = store
        .update(
            added.id,
            &IssuePatch {
                owner: Some(None),
                ..IssuePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation { .. }));
}

#[test]
fn update_unvalidated_fields_skip_validation() {
    let mut store = test_db();

    // A record whose title would fail today's rules, planted directly to
    // model historical data.
    let added = store
        .add(trackd::model::IssueInput {
            title: "abc".to_string(),
            ..trackd::model::IssueInput::default()
        })
        .unwrap();

    // Only effort changes: validation must not run at all.
    let updated = store
        .update(
            added.id,
            &IssuePatch {
                effort: Some(0),
                ..IssuePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.effort, 0);
}

#[test]
fn update_empty_patch_returns_current_record() {
    let mut store = test_db();
    let added = store.add(fixtures::input("unchanged")).unwrap();

    let result = store.update(added.id, &IssuePatch::default()).unwrap();
    assert_eq!(result, added);
}
