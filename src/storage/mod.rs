//! Storage backend: schema, sequence generator, and the issue store.

pub mod schema;
pub mod sequence;
pub mod sqlite;

pub use schema::{SEQ_DELETED_ISSUES, SEQ_ISSUES, apply_schema};
pub use sqlite::{IssueStore, PAGE_SIZE};
