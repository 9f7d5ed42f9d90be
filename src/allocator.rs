//! Hour allocation.
//!
//! The deficit is split evenly across the candidate issues, each share rounded
//! down to [`GRANULARITY`]. What rounding leaves over goes to a single issue
//! picked by [`absorbs_remainder`], so the plan always sums to the deficit.
//!
//! The remainder recipient is the first issue in server order. That is a
//! simple order-dependent rule, not a fairness guarantee.

use thiserror::Error;

use crate::models::IssueId;

/// Smallest billable unit, in hours.
pub const GRANULARITY: f64 = 0.1;

/// Maximum tolerated drift between the plan total and the deficit.
pub const BALANCE_TOLERANCE: f64 = 1e-9;

/// Slack added before flooring so that, say, `0.7 / 0.1` floors to 7 and not 6.
const FLOOR_SLACK: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    #[error("no candidate issues to allocate {deficit}h across")]
    NoCandidates { deficit: f64 },

    #[error("plan totals {total}h but the deficit is {deficit}h")]
    Unbalanced { deficit: f64, total: f64 },
}

/// Hours assigned to one issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanEntry {
    pub issue_id: IssueId,
    pub hours: f64,
}

/// A computed allocation together with the figures it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub deficit: f64,
    /// `deficit / n` before rounding.
    pub raw_share: f64,
    /// `raw_share` rounded down to [`GRANULARITY`].
    pub rounded_share: f64,
    /// `deficit - rounded_share * n`.
    pub remainder: f64,
    pub plan: Vec<PlanEntry>,
}

impl Allocation {
    pub fn total(&self) -> f64 {
        self.plan.iter().map(|e| e.hours).sum()
    }
}

/// Hours still missing for the day, or `None` when nothing needs tracking.
///
/// A gap within [`BALANCE_TOLERANCE`] counts as a full day: ledgers summed
/// from earlier plans land on values like `7.999999999999999`.
pub fn deficit(target: f64, tracked: f64) -> Option<f64> {
    let missing = target - tracked;
    if missing > BALANCE_TOLERANCE {
        Some(missing)
    } else {
        None
    }
}

/// Tie-break rule: the issue at this position takes the rounding remainder.
pub fn absorbs_remainder(index: usize) -> bool {
    index == 0
}

/// Spread `deficit` hours across `issues`, keeping their order.
pub fn allocate(deficit: f64, issues: &[IssueId]) -> Result<Allocation, AllocationError> {
    if issues.is_empty() {
        return Err(AllocationError::NoCandidates { deficit });
    }

    let n = issues.len() as f64;
    let raw_share = deficit / n;
    let rounded_share = (raw_share / GRANULARITY + FLOOR_SLACK).floor() * GRANULARITY;
    // Float noise can push this a hair below zero when the split is exact.
    let remainder = (deficit - rounded_share * n).max(0.0);

    let plan: Vec<PlanEntry> = issues
        .iter()
        .enumerate()
        .map(|(index, &issue_id)| PlanEntry {
            issue_id,
            hours: if absorbs_remainder(index) {
                rounded_share + remainder
            } else {
                rounded_share
            },
        })
        .collect();

    let allocation = Allocation {
        deficit,
        raw_share,
        rounded_share,
        remainder,
        plan,
    };

    let total = allocation.total();
    if (total - deficit).abs() > BALANCE_TOLERANCE {
        return Err(AllocationError::Unbalanced { deficit, total });
    }

    Ok(allocation)
}
