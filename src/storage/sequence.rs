//! Named monotonic sequence generator.
//!
//! Backs unique id assignment. The increment-and-read is a single SQL
//! statement, so two concurrent callers on the same counter name can never
//! observe the same value: SQLite serializes the writes and each caller
//! reads the row it just wrote.

use crate::error::{Result, TrackerError};
use rusqlite::Connection;

/// Atomically increment the named counter and return the post-increment value.
///
/// # Errors
///
/// Fails with `TrackerError::Sequence` if the increment does not touch
/// exactly one row, which signals a missing or corrupted counter row. The
/// caller must treat this as a fatal precondition failure, not retry.
pub fn next(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt =
        conn.prepare("UPDATE counters SET counter = counter + 1 WHERE name = ? RETURNING counter")?;

    let value = stmt
        .query_row([name], |row| row.get(0))
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => TrackerError::Sequence {
                name: name.to_string(),
            },
            other => TrackerError::Database(other),
        })?;

    Ok(value)
}
