#![allow(dead_code)]

use tempfile::TempDir;
use trackd::model::{IssueInput, Status};
use trackd::storage::IssueStore;

pub fn init_test_logging() {
    trackd::logging::init_test_logging();
}

pub fn test_db() -> IssueStore {
    init_test_logging();
    IssueStore::open_memory().expect("Failed to create test database")
}

pub fn test_db_with_dir() -> (IssueStore, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("trackd.db");
    let store = IssueStore::open(&db_path).expect("Failed to create test database");
    (store, dir)
}

pub mod fixtures {
    use super::{IssueInput, Status};

    /// A minimal valid candidate with the given title.
    pub fn input(title: &str) -> IssueInput {
        IssueInput {
            title: title.to_string(),
            ..IssueInput::default()
        }
    }

    /// A candidate with owner and status set.
    pub fn assigned(title: &str, owner: &str) -> IssueInput {
        IssueInput {
            title: title.to_string(),
            status: Some(Status::Assigned),
            owner: Some(owner.to_string()),
            ..IssueInput::default()
        }
    }

    /// A candidate with a fixed effort, for filter tests.
    pub fn with_effort(title: &str, effort: i64) -> IssueInput {
        IssueInput {
            title: title.to_string(),
            effort: Some(effort),
            ..IssueInput::default()
        }
    }
}
