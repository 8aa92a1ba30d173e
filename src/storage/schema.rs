//! Database schema definitions.

use rusqlite::{Connection, Result};

/// Logical sequence name for active issue ids.
pub const SEQ_ISSUES: &str = "issues";

/// Bookkeeping counter bumped on every soft delete.
pub const SEQ_DELETED_ISSUES: &str = "deletedIssues";

/// The complete SQL schema for the trackd database.
///
/// Two issue tables model the two logical sets; a record lives in exactly
/// one of them at a time. The unique index on `issues.id` is what surfaces
/// id collisions, and `deleted_issues.id` is unique for the same reason.
pub const SCHEMA_SQL: &str = r"
    -- Active set
    CREATE TABLE IF NOT EXISTS issues (
        id INTEGER NOT NULL,
        title TEXT NOT NULL,
        status TEXT NOT NULL,
        owner TEXT,
        effort INTEGER NOT NULL,
        created TEXT NOT NULL,
        due TEXT NOT NULL,
        description TEXT NOT NULL,
        deleted TEXT,
        restored TEXT,
        CHECK (id > 0),
        CHECK (status IN ('New', 'Assigned', 'Fixed', 'Closed'))
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_issues_id ON issues(id);
    CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
    CREATE INDEX IF NOT EXISTS idx_issues_effort ON issues(effort);
    CREATE INDEX IF NOT EXISTS idx_issues_owner ON issues(owner);

    -- Deleted set
    CREATE TABLE IF NOT EXISTS deleted_issues (
        id INTEGER NOT NULL,
        title TEXT NOT NULL,
        status TEXT NOT NULL,
        owner TEXT,
        effort INTEGER NOT NULL,
        created TEXT NOT NULL,
        due TEXT NOT NULL,
        description TEXT NOT NULL,
        deleted TEXT,
        restored TEXT,
        CHECK (id > 0)
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_deleted_issues_id ON deleted_issues(id);

    -- Named monotonic counters, owned by the sequence generator
    CREATE TABLE IF NOT EXISTS counters (
        name TEXT PRIMARY KEY,
        counter INTEGER NOT NULL
    );

    INSERT OR IGNORE INTO counters (name, counter) VALUES ('issues', 0);
    INSERT OR IGNORE INTO counters (name, counter) VALUES ('deletedIssues', 0);
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS` and the
/// counter seeds use `INSERT OR IGNORE`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(())
}
