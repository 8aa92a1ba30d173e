//! Core data types for `trackd`.
//!
//! This module defines the types used throughout the crate:
//! - `Issue` - the tracked work item
//! - `Status` - issue workflow states
//! - `IssueInput` - candidate record for `add`
//! - `IssuePatch` - partial-field update for `update`
//! - `IssueFilter` - conjunctive list/counts filter
//! - `IssuePage` - one page of list results
//! - `OwnerCounts` - one pivoted row of the counts aggregation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default effort assigned when `add` receives none.
pub const DEFAULT_EFFORT: i64 = 10;

/// Days between `created` and the default `due` date.
pub const DEFAULT_DUE_DAYS: i64 = 10;

/// Sentinel description stored when `add` receives none.
pub const DESCRIPTION_PLACEHOLDER: &str = "No description provided";

/// Issue workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    New,
    Assigned,
    Fixed,
    Closed,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Assigned => "Assigned",
            Self::Fixed => "Fixed",
            Self::Closed => "Closed",
        }
    }

    /// All statuses, in workflow order. Used by the counts pivot.
    pub const ALL: [Self; 4] = [Self::New, Self::Assigned, Self::Fixed, Self::Closed];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(Self::New),
            "Assigned" => Ok(Self::Assigned),
            "Fixed" => Ok(Self::Fixed),
            "Closed" => Ok(Self::Closed),
            other => Err(crate::error::TrackerError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// The primary issue entity.
///
/// An issue resides in exactly one of two logical sets at any time. The
/// `deleted` and `restored` stamps record the lifecycle transitions; set
/// membership itself is a storage-level fact, not a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Unique positive integer id, assigned once, never reassigned.
    pub id: i64,

    /// Title (at least 3 characters).
    pub title: String,

    /// Workflow status.
    #[serde(default)]
    pub status: Status,

    /// Owner; required when status is `Assigned`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Effort estimate.
    pub effort: i64,

    /// Creation timestamp, set once, immutable.
    pub created: DateTime<Utc>,

    /// Due date.
    pub due: DateTime<Utc>,

    /// Description.
    pub description: String,

    /// Soft-delete stamp, set at the moment the record moved to the
    /// deleted set. A restored record keeps it alongside `restored`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,

    /// Restoration stamp, set when the record moves back to active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored: Option<DateTime<Utc>>,
}

/// Candidate record for `add`.
///
/// Absent fields are filled with defaults before insertion: `id` from the
/// sequence generator, `created = now`, `due = created + 10 days`,
/// `effort = 10`, placeholder description, status `New`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IssueInput {
    /// Fill defaults and produce the record to persist.
    ///
    /// `id` must already be resolved (explicit or sequence-assigned).
    #[must_use]
    pub fn into_issue(self, id: i64) -> Issue {
        let created = self.created.unwrap_or_else(Utc::now);
        let due = self
            .due
            .unwrap_or(created + Duration::days(DEFAULT_DUE_DAYS));
        Issue {
            id,
            title: self.title,
            status: self.status.unwrap_or_default(),
            owner: self.owner,
            effort: self.effort.unwrap_or(DEFAULT_EFFORT),
            created,
            due,
            description: self
                .description
                .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
            deleted: None,
            restored: None,
        }
    }
}

/// Fields to update on an issue.
///
/// `Option<Option<String>>` on `owner` distinguishes "leave untouched"
/// (outer `None`) from "clear" (inner `None`).
#[derive(Debug, Clone, Default)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub status: Option<Status>,
    pub owner: Option<Option<String>>,
    pub effort: Option<i64>,
    pub due: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl IssuePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.owner.is_none()
            && self.effort.is_none()
            && self.due.is_none()
            && self.description.is_none()
    }

    /// Does this patch touch a validated field (`title`, `status`, `owner`)?
    ///
    /// Only then is the merged record re-validated; partial updates to other
    /// fields do not assert a complete, self-consistent record.
    #[must_use]
    pub const fn touches_validated_fields(&self) -> bool {
        self.title.is_some() || self.status.is_some() || self.owner.is_some()
    }

    /// Overlay this patch onto a stored record.
    #[must_use]
    pub fn merged_into(&self, mut issue: Issue) -> Issue {
        if let Some(ref title) = self.title {
            issue.title.clone_from(title);
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(ref owner) = self.owner {
            issue.owner.clone_from(owner);
        }
        if let Some(effort) = self.effort {
            issue.effort = effort;
        }
        if let Some(due) = self.due {
            issue.due = due;
        }
        if let Some(ref description) = self.description {
            issue.description.clone_from(description);
        }
        issue
    }
}

/// Conjunctive filter for `list` and `counts`.
///
/// Effort bounds are inclusive and independently optional; zero is a valid
/// bound and is not treated as "absent".
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub effort_min: Option<i64>,
    pub effort_max: Option<i64>,
}

/// One page of `list` results.
#[derive(Debug, Clone, Serialize)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    /// Total number of pages the filtered view divides into.
    pub pages: i64,
}

/// One pivoted row of the counts aggregation: a distinct owner with one
/// count per status value encountered. Absent statuses are omitted from
/// serialized output, not zero-filled.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct OwnerCounts {
    pub owner: Option<String>,
    #[serde(rename = "New", skip_serializing_if = "Option::is_none")]
    pub new: Option<i64>,
    #[serde(rename = "Assigned", skip_serializing_if = "Option::is_none")]
    pub assigned: Option<i64>,
    #[serde(rename = "Fixed", skip_serializing_if = "Option::is_none")]
    pub fixed: Option<i64>,
    #[serde(rename = "Closed", skip_serializing_if = "Option::is_none")]
    pub closed: Option<i64>,
}

impl OwnerCounts {
    /// Start an empty row for the given owner.
    #[must_use]
    pub fn for_owner(owner: Option<String>) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    /// Record the grouped count for one status.
    pub const fn set(&mut self, status: Status, count: i64) {
        match status {
            Status::New => self.new = Some(count),
            Status::Assigned => self.assigned = Some(count),
            Status::Fixed => self.fixed = Some(count),
            Status::Closed => self.closed = Some(count),
        }
    }

    /// Read the recorded count for one status.
    #[must_use]
    pub const fn get(&self, status: Status) -> Option<i64> {
        match status {
            Status::New => self.new,
            Status::Assigned => self.assigned,
            Status::Fixed => self.fixed,
            Status::Closed => self.closed,
        }
    }
}
