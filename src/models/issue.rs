use serde::Deserialize;

use super::{IdName, IssueId};

/// An issue as returned by `GET /issues.json`.
///
/// Redmine omits empty fields, so everything beyond `id` is defaulted.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub project: Option<IdName>,
    #[serde(default)]
    pub tracker: Option<IdName>,
    #[serde(default)]
    pub status_id: Option<u64>,
    #[serde(default)]
    pub status: Option<IdName>,
    #[serde(default)]
    pub priority: Option<IdName>,
    #[serde(default)]
    pub author: Option<IdName>,
    #[serde(default)]
    pub assigned_to: Option<IdName>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status_date: Option<String>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Issue {
    /// Minimal issue with only the fields the allocator cares about.
    pub fn new(id: IssueId, subject: impl Into<String>) -> Self {
        Self {
            id,
            subject: subject.into(),
            description: None,
            project_id: None,
            project: None,
            tracker: None,
            status_id: None,
            status: None,
            priority: None,
            author: None,
            assigned_to: None,
            notes: None,
            status_date: None,
            created_on: None,
            updated_on: None,
            custom_fields: Vec::new(),
        }
    }

    /// Project name for display, if the server sent one.
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }
}

/// A custom field value. Redmine sends strings, arrays or null here.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Envelope of `GET /issues.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueList {
    pub issues: Vec<Issue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_issue_payload() {
        let json = r#"{
            "issues": [{
                "id": 4211,
                "subject": "Export invoices",
                "description": "CSV export",
                "project": {"id": 3, "name": "Billing"},
                "tracker": {"id": 1, "name": "Feature"},
                "status": {"id": 2, "name": "In Progress"},
                "priority": {"id": 4, "name": "Normal"},
                "author": {"id": 7, "name": "Dana"},
                "assigned_to": {"id": 9, "name": "Robin"},
                "created_on": "2024-03-01T09:00:00Z",
                "updated_on": "2024-03-02T09:00:00Z",
                "custom_fields": [
                    {"id": 1, "name": "Sprint", "value": "12"},
                    {"id": 2, "name": "Tags", "value": ["a", "b"]}
                ]
            }]
        }"#;

        let list: IssueList = serde_json::from_str(json).unwrap();
        let issue = &list.issues[0];
        assert_eq!(issue.id, 4211);
        assert_eq!(issue.project_name(), Some("Billing"));
        assert_eq!(issue.custom_fields.len(), 2);
        assert!(issue.custom_fields[1].value.is_array());
    }

    #[test]
    fn decodes_sparse_issue_payload() {
        let list: IssueList =
            serde_json::from_str(r#"{"issues": [{"id": 1, "description": null}]}"#).unwrap();
        assert_eq!(list.issues[0].id, 1);
        assert!(list.issues[0].subject.is_empty());
        assert!(list.issues[0].description.is_none());
    }
}
