//! Candidate issues for allocation.

use crate::client::RedmineApi;
use crate::models::Issue;

/// Issues assigned to the current user in server order, or `None` if they
/// could not be read. The order is never changed here; the allocator's
/// remainder rule depends on it.
pub async fn read_candidates<A: RedmineApi>(api: &A) -> Option<Vec<Issue>> {
    match api.my_issues().await {
        Ok(issues) => {
            for issue in &issues {
                tracing::debug!(
                    id = issue.id,
                    project = issue.project_name().unwrap_or("-"),
                    "candidate #{} {}",
                    issue.id,
                    issue.subject
                );
            }
            Some(issues)
        }
        Err(e) => {
            tracing::warn!("Could not read assigned issues, nothing will be tracked: {}", e);
            None
        }
    }
}
