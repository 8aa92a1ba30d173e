//! trackd: issue-tracking backend core.
//!
//! The crate implements the issue lifecycle and query engine: validated
//! creation with sequence-assigned ids, partial updates, soft delete and
//! restore as two-phase moves between an active and a deleted set,
//! paginated filtered listing, text search, per-owner status aggregation,
//! and a session gate composed around every mutating operation.
//!
//! The HTTP/query-language surface and identity verification live outside
//! this crate; they call into [`api::IssueApi`] with a resolved
//! [`auth::Session`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{Result, TrackerError, ValidationError};
pub use model::{Issue, IssueFilter, IssueInput, IssuePage, IssuePatch, OwnerCounts, Status};
