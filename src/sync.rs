//! The daily sync workflow.
//!
//! ```text
//! read ledger ─► deficit? ─► read issues ─► allocate ─► submit (concurrently)
//! ```
//!
//! Each step short-circuits into a [`SyncOutcome`] describing why nothing
//! (more) happened. Submissions are independent: one failure does not stop
//! the others, and earlier successes are never rolled back.

use chrono::NaiveDate;
use futures::future::join_all;
use thiserror::Error;

use crate::allocator::{self, Allocation, AllocationError, PlanEntry};
use crate::client::{ClientError, RedmineApi};
use crate::issues;
use crate::ledger::{self, LedgerPolicy};
use crate::models::{IssueId, NewTimeEntry};

/// Activity id meaning "Development" on a stock Redmine install.
pub const DEFAULT_ACTIVITY_ID: u64 = 9;

/// Hours per day when nothing else is configured.
pub const DEFAULT_WORK_HOURS: f64 = 8.0;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read time entries: {0}")]
    Ledger(#[source] ClientError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub day: NaiveDate,
    pub target_hours: f64,
    pub dry_run: bool,
    pub activity_id: u64,
    pub ledger_policy: LedgerPolicy,
}

impl RunContext {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            target_hours: DEFAULT_WORK_HOURS,
            dry_run: false,
            activity_id: DEFAULT_ACTIVITY_ID,
            ledger_policy: LedgerPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryStatus {
    Created,
    /// Dry run: nothing was sent.
    Simulated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryResult {
    pub issue_id: IssueId,
    pub hours: f64,
    pub status: EntryStatus,
}

/// The allocation that was applied and what happened to each entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub allocation: Allocation,
    pub results: Vec<EntryResult>,
}

impl Submission {
    pub fn failures(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, EntryStatus::Failed(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The day already holds at least the target hours.
    AlreadyTracked,
    /// Assigned issues could not be read.
    IssuesUnavailable,
    /// Hours are missing but nothing is assigned.
    NoCandidates { deficit: f64 },
    Tracked(Submission),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub day: NaiveDate,
    pub target_hours: f64,
    pub tracked_hours: f64,
    pub outcome: SyncOutcome,
}

impl SyncReport {
    pub fn failures(&self) -> usize {
        match &self.outcome {
            SyncOutcome::Tracked(submission) => submission.failures(),
            _ => 0,
        }
    }
}

/// Run the whole workflow once.
pub async fn run<A: RedmineApi>(api: &A, ctx: &RunContext) -> Result<SyncReport, SyncError> {
    tracing::info!("Target day is {}", ctx.day);

    let tracked_hours = ledger::read_tracked_hours(api, ctx.day, ctx.ledger_policy).await?;
    tracing::info!("Tracked on {}: {}h", ctx.day, tracked_hours);

    let report = |outcome| SyncReport {
        day: ctx.day,
        target_hours: ctx.target_hours,
        tracked_hours,
        outcome,
    };

    let Some(deficit) = allocator::deficit(ctx.target_hours, tracked_hours) else {
        tracing::info!(
            "Already tracked {}h of {}h, nothing to do",
            tracked_hours,
            ctx.target_hours
        );
        return Ok(report(SyncOutcome::AlreadyTracked));
    };

    let Some(candidates) = issues::read_candidates(api).await else {
        return Ok(report(SyncOutcome::IssuesUnavailable));
    };

    let ids: Vec<IssueId> = candidates.iter().map(|issue| issue.id).collect();
    let allocation = match allocator::allocate(deficit, &ids) {
        Ok(allocation) => allocation,
        Err(AllocationError::NoCandidates { deficit }) => {
            tracing::warn!("Missing {}h but no issues are assigned", deficit);
            return Ok(report(SyncOutcome::NoCandidates { deficit }));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "Missing hours: {} Issues: {} Time per issue: {} (rounded: {}) Extra time: {} To track: {}",
        allocation.deficit,
        allocation.plan.len(),
        allocation.raw_share,
        allocation.rounded_share,
        allocation.remainder,
        allocation.total()
    );

    let results = submit(api, ctx, &allocation.plan).await;
    Ok(report(SyncOutcome::Tracked(Submission {
        allocation,
        results,
    })))
}

/// Send every plan entry at once and wait for all of them.
async fn submit<A: RedmineApi>(
    api: &A,
    ctx: &RunContext,
    plan: &[PlanEntry],
) -> Vec<EntryResult> {
    let pending = plan.iter().map(|entry| async move {
        tracing::info!("Tracking {}h in #{}", entry.hours, entry.issue_id);

        let status = if ctx.dry_run {
            EntryStatus::Simulated
        } else {
            let new_entry = NewTimeEntry {
                issue_id: entry.issue_id,
                spent_on: ctx.day,
                hours: entry.hours,
                activity_id: ctx.activity_id,
            };
            match api.create_time_entry(new_entry).await {
                Ok(()) => EntryStatus::Created,
                Err(e) => {
                    tracing::error!(
                        "Failed to track {}h in #{}: {}",
                        entry.hours,
                        entry.issue_id,
                        e
                    );
                    EntryStatus::Failed(e.to_string())
                }
            }
        };

        EntryResult {
            issue_id: entry.issue_id,
            hours: entry.hours,
            status,
        }
    });

    join_all(pending).await
}
