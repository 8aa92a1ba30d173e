//! `SQLite` issue store: CRUD, lifecycle moves, and the query engine.

use crate::error::{Result, TrackerError};
use crate::model::{Issue, IssueFilter, IssueInput, IssuePage, IssuePatch, OwnerCounts, Status};
use crate::storage::schema::{SEQ_DELETED_ISSUES, SEQ_ISSUES, apply_schema};
use crate::storage::sequence;
use crate::validation::IssueValidator;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed page size for `list`.
pub const PAGE_SIZE: i64 = 10;

const ISSUE_COLUMNS: &str =
    "id, title, status, owner, effort, created, due, description, deleted, restored";

/// SQLite-based issue store.
///
/// Owns a single connection; all cross-step consistency (sequence
/// generation, two-phase moves) relies on per-statement atomicity, never on
/// an in-process lock. The store does not assume it is the sole writer.
#[derive(Debug)]
pub struct IssueStore {
    conn: Connection,
}

impl IssueStore {
    /// Open a connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Next value of the named id sequence.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Sequence` if the counter row is missing.
    pub fn next_sequence(&self, name: &str) -> Result<i64> {
        sequence::next(&self.conn, name)
    }

    // ========================================================================
    // LIFECYCLE OPERATIONS
    // ========================================================================

    /// Validate, fill defaults, and insert a new issue into the active set.
    ///
    /// The id is taken from the candidate when supplied, otherwise assigned
    /// from the `issues` sequence. Returns the persisted record, re-read by
    /// its storage-assigned surrogate key (rowid).
    ///
    /// # Errors
    ///
    /// - `Validation` when the candidate violates structural invariants
    /// - `Sequence` when id assignment finds no counter row
    /// - `Store` when the insert does not report a new row
    /// - `Database` on id collision (unique index) or other SQL failures
    pub fn add(&mut self, input: IssueInput) -> Result<Issue> {
        IssueValidator::validate_input(&input).map_err(TrackerError::from_validation_errors)?;

        let id = match input.id {
            Some(explicit) => explicit,
            None => self.next_sequence(SEQ_ISSUES)?,
        };
        let issue = input.into_issue(id);

        let inserted = self.insert_issue("issues", &issue)?;
        if inserted != 1 {
            return Err(TrackerError::Store {
                reason: format!("insert of issue {id} reported no new row"),
            });
        }
        let rowid = self.conn.last_insert_rowid();
        debug!(id, rowid, "issue added");

        // Re-read by surrogate key so the caller sees persisted state.
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE rowid = ?");
        let issue = self
            .conn
            .query_row(&sql, [rowid], |row| Self::issue_from_row(row))
            .map_err(|_| TrackerError::Store {
                reason: format!("issue {id} missing after insert"),
            })?;
        Ok(issue)
    }

    /// Get an active issue by id. Absence is a soft miss, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get(&self, id: i64) -> Result<Option<Issue>> {
        self.get_from(id, "issues")
    }

    /// Get a soft-deleted issue by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_deleted(&self, id: i64) -> Result<Option<Issue>> {
        self.get_from(id, "deleted_issues")
    }

    /// Apply a partial-field patch to an active issue.
    ///
    /// When the patch touches `title`, `status`, or `owner`, the merged
    /// (stored ∪ patch) record is re-validated first; other partial updates
    /// skip validation entirely. Returns the record re-read post-update.
    ///
    /// # Errors
    ///
    /// - `Validation` when the merged record violates structural invariants
    /// - `Update` when no row matched the id
    pub fn update(&mut self, id: i64, patch: &IssuePatch) -> Result<Issue> {
        if patch.touches_validated_fields() {
            let current = self.get(id)?.ok_or(TrackerError::Update { id })?;
            let merged = patch.merged_into(current);
            IssueValidator::validate_merged(&merged)
                .map_err(TrackerError::from_validation_errors)?;
        }

        if patch.is_empty() {
            return self.get(id)?.ok_or(TrackerError::Update { id });
        }

        let mut set_clauses: Vec<String> = vec![];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        let mut add_update = |field: &str, val: Box<dyn rusqlite::ToSql>| {
            set_clauses.push(format!("{field} = ?"));
            params.push(val);
        };

        if let Some(ref title) = patch.title {
            add_update("title", Box::new(title.clone()));
        }
        if let Some(status) = patch.status {
            add_update("status", Box::new(status.as_str().to_string()));
        }
        if let Some(ref owner) = patch.owner {
            add_update("owner", Box::new(owner.clone()));
        }
        if let Some(effort) = patch.effort {
            add_update("effort", Box::new(effort));
        }
        if let Some(due) = patch.due {
            add_update("due", Box::new(due.to_rfc3339()));
        }
        if let Some(ref description) = patch.description {
            add_update("description", Box::new(description.clone()));
        }

        let sql = format!("UPDATE issues SET {} WHERE id = ?", set_clauses.join(", "));
        params.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let matched = self.conn.execute(&sql, params_refs.as_slice())?;
        if matched == 0 {
            return Err(TrackerError::Update { id });
        }

        self.get(id)?.ok_or(TrackerError::Update { id })
    }

    /// Soft-delete an active issue: stamp it and move it to the deleted set.
    ///
    /// Two-phase move: the stamped record is inserted into the deleted set
    /// before the original leaves the active set, so a crash mid-operation
    /// leaves the record duplicated rather than lost. A missing id returns
    /// `false` without error. The `deletedIssues` bookkeeping counter bump
    /// between the phases is best-effort.
    ///
    /// Returns `true` iff exactly one active record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a database statement fails.
    pub fn remove(&mut self, id: i64) -> Result<bool> {
        let Some(mut issue) = self.get(id)? else {
            return Ok(false);
        };
        issue.deleted = Some(Utc::now());

        // Phase 1: destination first.
        let inserted = self.insert_issue("deleted_issues", &issue)?;
        if inserted != 1 {
            return Ok(false);
        }

        if let Err(err) = self.bump_deleted_counter() {
            warn!("deletedIssues counter bump failed: {err}");
        }

        // Phase 2: only now does the record leave the active set.
        let removed = self.conn.execute("DELETE FROM issues WHERE id = ?", [id])?;
        debug!(id, "issue soft-deleted");
        Ok(removed == 1)
    }

    /// Restore a soft-deleted issue back to the active set.
    ///
    /// Same duplicate-over-loss ordering as `remove`: insert into active,
    /// then delete from the deleted set. A missing id returns `None`.
    /// Returns the restored record, re-read from the active set.
    ///
    /// # Errors
    ///
    /// Returns an error if a database statement fails, including an id
    /// collision when an active record with the same id already exists.
    pub fn restore(&mut self, id: i64) -> Result<Option<Issue>> {
        let Some(mut issue) = self.get_deleted(id)? else {
            return Ok(None);
        };
        issue.restored = Some(Utc::now());

        let inserted = self.insert_issue("issues", &issue)?;
        if inserted != 1 {
            return Err(TrackerError::Store {
                reason: format!("restore of issue {id} reported no new row"),
            });
        }

        self.conn
            .execute("DELETE FROM deleted_issues WHERE id = ?", [id])?;
        debug!(id, "issue restored");

        self.get(id)
    }

    // ========================================================================
    // QUERY ENGINE
    // ========================================================================

    /// List active issues matching the filter, one fixed-size page at a time.
    ///
    /// Results are ordered by `id` ascending for stable pagination. A page
    /// value that is absent or ≤ 0 is clamped to 1. `pages` is the total
    /// number of pages the filtered view divides into; count and slice are
    /// computed against the same filter.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub fn list(&self, filter: &IssueFilter, page: Option<i64>) -> Result<IssuePage> {
        let page = page.filter(|p| *p > 0).unwrap_or(1);

        let (clause, count_params) = filter_clause(filter);
        let count_refs: Vec<&dyn rusqlite::ToSql> = count_params.iter().map(AsRef::as_ref).collect();

        let count_sql = format!("SELECT COUNT(*) FROM issues{clause}");
        let total: i64 = self
            .conn
            .query_row(&count_sql, count_refs.as_slice(), |row| row.get(0))?;

        let slice_sql = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues{clause} ORDER BY id ASC LIMIT ? OFFSET ?"
        );
        let (_, mut slice_params) = filter_clause(filter);
        slice_params.push(Box::new(PAGE_SIZE));
        slice_params.push(Box::new(PAGE_SIZE * (page - 1)));
        let slice_refs: Vec<&dyn rusqlite::ToSql> =
            slice_params.iter().map(AsRef::as_ref).collect();

        let mut stmt = self.conn.prepare(&slice_sql)?;
        let issues = stmt
            .query_map(slice_refs.as_slice(), |row| Self::issue_from_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(IssuePage {
            issues,
            pages: (total + PAGE_SIZE - 1) / PAGE_SIZE,
        })
    }

    /// Full-text match against `title` and `description`.
    ///
    /// Returns all matches, unordered and unpaginated. An empty or
    /// whitespace-only query matches nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn search(&self, query: &str) -> Result<Vec<Issue>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE title LIKE ? OR description LIKE ?"
        );
        let pattern = format!("%{trimmed}%");

        let mut stmt = self.conn.prepare(&sql)?;
        let issues = stmt
            .query_map([&pattern, &pattern], |row| Self::issue_from_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    /// Group active issues by `(owner, status)` and pivot into one sparse
    /// row per distinct owner, in owner-first-seen order. Ownerless issues
    /// group under a null owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn counts(&self, filter: &IssueFilter) -> Result<Vec<OwnerCounts>> {
        let (clause, params) = filter_clause(filter);
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();

        let sql = format!(
            "SELECT owner, status, COUNT(*) FROM issues{clause} GROUP BY owner, status"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let grouped = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut rows: Vec<OwnerCounts> = Vec::new();
        let mut index: HashMap<Option<String>, usize> = HashMap::new();
        for (owner, status_str, count) in grouped {
            let status = Status::from_str(&status_str)?;
            let at = *index.entry(owner.clone()).or_insert_with(|| {
                rows.push(OwnerCounts::for_owner(owner.clone()));
                rows.len() - 1
            });
            rows[at].set(status, count);
        }

        Ok(rows)
    }

    /// Number of records currently in the active set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of records currently in the deleted set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_deleted(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM deleted_issues", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========================================================================
    // DEVELOPER SEEDING
    // ========================================================================

    /// Wipe the active set and repopulate it with `n` generated issues,
    /// resetting the `issues` counter to `n`.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub fn seed(&mut self, n: i64) -> Result<i64> {
        const OWNERS: [&str; 6] = ["Ali", "Hanan", "Sara", "Ibrahem", "Ahmed", "Mohamed"];
        const STATUSES: [Status; 4] = Status::ALL;

        self.conn.execute("DELETE FROM issues", [])?;

        let created = Utc::now();
        for i in 1..=n {
            let pick = usize::try_from(i).unwrap_or(0);
            let status = STATUSES[pick % STATUSES.len()];
            let issue = Issue {
                id: i,
                title: format!("Seeded issue {i}"),
                status,
                owner: Some(OWNERS[pick % OWNERS.len()].to_string()),
                effort: i,
                created,
                due: created + chrono::Duration::days(10),
                description: format!("Description for seeded issue {i}"),
                deleted: None,
                restored: None,
            };
            self.insert_issue("issues", &issue)?;
        }

        self.conn.execute(
            "INSERT INTO counters (name, counter) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET counter = excluded.counter",
            rusqlite::params![SEQ_ISSUES, n],
        )?;

        Ok(n)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn get_from(&self, id: i64, table: &str) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM {table} WHERE id = ?");
        let mut stmt = self.conn.prepare(&sql)?;
        let result = stmt.query_row([id], |row| Self::issue_from_row(row));

        match result {
            Ok(issue) => Ok(Some(issue)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_issue(&self, table: &str, issue: &Issue) -> Result<usize> {
        let sql = format!(
            "INSERT INTO {table} (id, title, status, owner, effort, created, due, description, deleted, restored)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        let inserted = self.conn.execute(
            &sql,
            rusqlite::params![
                issue.id,
                issue.title,
                issue.status.as_str(),
                issue.owner,
                issue.effort,
                issue.created.to_rfc3339(),
                issue.due.to_rfc3339(),
                issue.description,
                issue.deleted.map(|dt| dt.to_rfc3339()),
                issue.restored.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(inserted)
    }

    fn bump_deleted_counter(&self) -> Result<()> {
        self.conn.execute(
            "INSERT INTO counters (name, counter) VALUES (?, 1)
             ON CONFLICT(name) DO UPDATE SET counter = counter + 1",
            [SEQ_DELETED_ISSUES],
        )?;
        Ok(())
    }

    fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
        let status_str: String = row.get(2)?;
        let created_str: String = row.get(5)?;
        let due_str: String = row.get(6)?;
        let deleted_str: Option<String> = row.get(8)?;
        let restored_str: Option<String> = row.get(9)?;

        Ok(Issue {
            id: row.get(0)?,
            title: row.get(1)?,
            status: Status::from_str(&status_str).unwrap_or_default(),
            owner: row.get(3)?,
            effort: row.get(4)?,
            created: parse_datetime(&created_str),
            due: parse_datetime(&due_str),
            description: row.get(7)?,
            deleted: deleted_str.as_deref().map(parse_datetime),
            restored: restored_str.as_deref().map(parse_datetime),
        })
    }
}

/// Build the conjunctive WHERE clause for `list`/`counts`.
///
/// Each effort bound is tested independently so a zero bound is honored.
fn filter_clause(filter: &IssueFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clause = String::from(" WHERE 1=1");
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(status) = filter.status {
        clause.push_str(" AND status = ?");
        params.push(Box::new(status.as_str().to_string()));
    }
    if let Some(min) = filter.effort_min {
        clause.push_str(" AND effort >= ?");
        params.push(Box::new(min));
    }
    if let Some(max) = filter.effort_max {
        clause.push_str(" AND effort <= ?");
        params.push(Box::new(max));
    }

    (clause, params)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
