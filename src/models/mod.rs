//! Wire models for the Redmine REST API.
//!
//! # Core Concepts
//!
//! - [`Issue`]: A work item assigned to the current user. Read-only snapshot;
//!   only `id` is interpreted, the rest is carried through for logging.
//! - [`TimeEntry`]: Hours already logged against an issue on a given day.
//! - [`NewTimeEntry`]: The write-only record posted once per allocated issue.

mod issue;
mod time_entry;

pub use issue::*;
pub use time_entry::*;

use serde::Deserialize;

/// Identifier of a Redmine issue.
pub type IssueId = u64;

/// The `{id, name}` pair Redmine uses for projects, trackers, users and the like.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdName {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A bare `{id}` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IdRef {
    pub id: u64,
}
