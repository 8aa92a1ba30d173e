//! The operation surface the boundary layers call into.
//!
//! `IssueApi` wires the authorization gate around the mutating store
//! operations exactly once, at construction. Read operations pass through
//! ungated. The boundary layer (query-language binding, CLI) resolves a
//! per-request `Session` and hands it in; the core only reads it.

use crate::auth::{Session, require_session};
use crate::error::Result;
use crate::model::{Issue, IssueFilter, IssueInput, IssuePage, IssuePatch, OwnerCounts};
use crate::storage::IssueStore;

type GatedOp<A, R> = Box<dyn Fn(&mut IssueStore, &Session, A) -> Result<R> + Send + Sync>;

/// Gated operation table over an issue store.
pub struct IssueApi {
    add: GatedOp<IssueInput, Issue>,
    update: GatedOp<(i64, IssuePatch), Issue>,
    remove: GatedOp<i64, bool>,
    restore: GatedOp<i64, Option<Issue>>,
}

impl IssueApi {
    /// Build the operation table, composing the session gate around every
    /// mutating operation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            add: Box::new(require_session(
                |store: &mut IssueStore, _session: &Session, input| store.add(input),
            )),
            update: Box::new(require_session(
                |store: &mut IssueStore, _session: &Session, (id, patch): (i64, IssuePatch)| {
                    store.update(id, &patch)
                },
            )),
            remove: Box::new(require_session(
                |store: &mut IssueStore, _session: &Session, id| store.remove(id),
            )),
            restore: Box::new(require_session(
                |store: &mut IssueStore, _session: &Session, id| store.restore(id),
            )),
        }
    }

    /// Add a new issue. Gated.
    ///
    /// # Errors
    ///
    /// Fails with `Authentication` for anonymous sessions, before any store
    /// access; otherwise propagates the store's result.
    pub fn add(&self, store: &mut IssueStore, session: &Session, input: IssueInput) -> Result<Issue> {
        (self.add)(store, session, input)
    }

    /// Patch an existing issue. Gated.
    ///
    /// # Errors
    ///
    /// Fails with `Authentication` for anonymous sessions; otherwise
    /// propagates the store's result.
    pub fn update(
        &self,
        store: &mut IssueStore,
        session: &Session,
        id: i64,
        patch: IssuePatch,
    ) -> Result<Issue> {
        (self.update)(store, session, (id, patch))
    }

    /// Soft-delete an issue. Gated.
    ///
    /// # Errors
    ///
    /// Fails with `Authentication` for anonymous sessions; otherwise
    /// propagates the store's result.
    pub fn remove(&self, store: &mut IssueStore, session: &Session, id: i64) -> Result<bool> {
        (self.remove)(store, session, id)
    }

    /// Restore a soft-deleted issue. Gated.
    ///
    /// # Errors
    ///
    /// Fails with `Authentication` for anonymous sessions; otherwise
    /// propagates the store's result.
    pub fn restore(
        &self,
        store: &mut IssueStore,
        session: &Session,
        id: i64,
    ) -> Result<Option<Issue>> {
        (self.restore)(store, session, id)
    }

    /// Get an active issue by id. Never gated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get(&self, store: &IssueStore, id: i64) -> Result<Option<Issue>> {
        store.get(id)
    }

    /// List one page of filtered active issues. Never gated.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub fn list(
        &self,
        store: &IssueStore,
        filter: &IssueFilter,
        page: Option<i64>,
    ) -> Result<IssuePage> {
        store.list(filter, page)
    }

    /// Text search over title and description. Never gated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn search(&self, store: &IssueStore, query: &str) -> Result<Vec<Issue>> {
        store.search(query)
    }

    /// Owner-by-status aggregation. Never gated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn counts(&self, store: &IssueStore, filter: &IssueFilter) -> Result<Vec<OwnerCounts>> {
        store.counts(filter)
    }
}

impl Default for IssueApi {
    fn default() -> Self {
        Self::new()
    }
}
