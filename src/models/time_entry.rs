use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{IdName, IdRef, IssueId};

/// A recorded time entry as returned by `GET /time_entries.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    #[serde(default)]
    pub project: Option<IdName>,
    /// Entries can be logged on a project without an issue.
    #[serde(default)]
    pub issue: Option<IdRef>,
    #[serde(default)]
    pub user: Option<IdName>,
    #[serde(default)]
    pub activity: Option<IdName>,
    pub hours: f64,
    pub spent_on: NaiveDate,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
}

/// Envelope of `GET /time_entries.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeEntryList {
    pub time_entries: Vec<TimeEntry>,
}

/// Body of a time entry creation. Posted wrapped in [`TimeEntryEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTimeEntry {
    pub issue_id: IssueId,
    pub spent_on: NaiveDate,
    pub hours: f64,
    pub activity_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeEntryEnvelope {
    pub time_entry: NewTimeEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_entry_without_issue() {
        let json = r#"{"time_entries": [
            {"id": 1, "project": {"id": 2, "name": "Ops"}, "hours": 1.5, "spent_on": "2024-05-06"}
        ]}"#;

        let list: TimeEntryList = serde_json::from_str(json).unwrap();
        let entry = &list.time_entries[0];
        assert!(entry.issue.is_none());
        assert_eq!(entry.hours, 1.5);
        assert_eq!(entry.spent_on, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn encodes_creation_envelope() {
        let body = TimeEntryEnvelope {
            time_entry: NewTimeEntry {
                issue_id: 42,
                spent_on: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
                hours: 2.5,
                activity_id: 9,
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "time_entry": {
                    "issue_id": 42,
                    "spent_on": "2024-05-06",
                    "hours": 2.5,
                    "activity_id": 9
                }
            })
        );
    }
}
