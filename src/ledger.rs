//! Hours already tracked on the target day.

use chrono::NaiveDate;

use crate::client::RedmineApi;
use crate::models::TimeEntry;
use crate::sync::SyncError;

/// What to do when the time entries cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerPolicy {
    /// Treat the day as empty and carry on.
    #[default]
    FailOpen,
    /// Abort the run.
    Strict,
}

/// Sum the hours of every entry spent on `day`.
pub fn tracked_hours(entries: &[TimeEntry], day: NaiveDate) -> f64 {
    entries
        .iter()
        .filter(|entry| entry.spent_on == day)
        .map(|entry| entry.hours)
        .sum()
}

/// Fetch the user's recent entries and total the ones for `day`.
pub async fn read_tracked_hours<A: RedmineApi>(
    api: &A,
    day: NaiveDate,
    policy: LedgerPolicy,
) -> Result<f64, SyncError> {
    match api.my_time_entries().await {
        Ok(entries) => {
            tracing::debug!(entries = entries.len(), "fetched time entries");
            Ok(tracked_hours(&entries, day))
        }
        Err(e) => match policy {
            LedgerPolicy::FailOpen => {
                tracing::warn!("Could not read time entries, assuming nothing tracked: {}", e);
                Ok(0.0)
            }
            LedgerPolicy::Strict => Err(SyncError::Ledger(e)),
        },
    }
}
