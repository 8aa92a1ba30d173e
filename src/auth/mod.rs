//! Session model and the authorization gate.
//!
//! A `Session` is derived per request from a verified external credential
//! and discarded at request end; the core only reads it, never constructs
//! one from raw credentials. `require_session` is the gate: a higher-order
//! wrapper composed once at wiring time around each mutating operation.

use crate::error::{Result, TrackerError};
use crate::storage::IssueStore;
use serde::{Deserialize, Serialize};

/// Per-request, non-persisted authentication result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub signed_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    /// The session of an unauthenticated caller.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            signed_in: false,
            given_name: None,
            name: None,
            email: None,
        }
    }

    /// A signed-in session carrying verified identity fields.
    #[must_use]
    pub fn signed_in(
        given_name: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            signed_in: true,
            given_name: Some(given_name.into()),
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

/// Wrap an operation so it executes only for signed-in sessions.
///
/// Anonymous callers fail with `TrackerError::Authentication` before the
/// wrapped operation (and therefore the store) is touched. The wrapper is
/// applied once when the operation table is built, not re-derived inside
/// every handler.
pub fn require_session<A, R, F>(
    op: F,
) -> impl Fn(&mut IssueStore, &Session, A) -> Result<R> + Send + Sync
where
    F: Fn(&mut IssueStore, &Session, A) -> Result<R> + Send + Sync,
{
    move |store, session, args| {
        if !session.signed_in {
            return Err(TrackerError::Authentication);
        }
        op(store, session, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_is_blocked() {
        let gated = require_session(|_store: &mut IssueStore, _session: &Session, x: i32| Ok(x + 1));
        let mut store = IssueStore::open_memory().unwrap();
        let err = gated(&mut store, &Session::anonymous(), 1).unwrap_err();
        assert!(matches!(err, TrackerError::Authentication));
    }

    #[test]
    fn signed_in_session_passes_through() {
        let gated = require_session(|_store: &mut IssueStore, _session: &Session, x: i32| Ok(x + 1));
        let mut store = IssueStore::open_memory().unwrap();
        let session = Session::signed_in("Ada", "Ada Lovelace", "ada@example.com");
        assert_eq!(gated(&mut store, &session, 1).unwrap(), 2);
    }

    #[test]
    fn wrapped_operation_never_runs_for_anonymous() {
        use std::sync::atomic::{AtomicBool, Ordering};
        let touched = AtomicBool::new(false);
        let gated = require_session(|_store: &mut IssueStore, _session: &Session, ()| {
            touched.store(true, Ordering::SeqCst);
            Ok(())
        });
        let mut store = IssueStore::open_memory().unwrap();
        let _ = gated(&mut store, &Session::anonymous(), ());
        assert!(!touched.load(Ordering::SeqCst));
    }

    #[test]
    fn session_serialization_omits_absent_identity() {
        let json = serde_json::to_string(&Session::anonymous()).unwrap();
        assert_eq!(json, "{\"signed_in\":false}");
    }
}
