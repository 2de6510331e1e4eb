//! Redmine issue data model, limited to the attributes the relay reads or writes.

use serde::{Deserialize, Serialize};

/// `{ "id": .., "name": .. }` reference embedded in an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueStatusRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Custom field as returned on an issue.
///
/// `value` is kept as raw JSON since Redmine sends a string, a list
/// (multi-value fields) or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomField {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Issue as seen by the relay. Never cached between calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub id: u64,
    pub status: IssueStatusRef,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Issue {
    /// Returns the id of the custom field with the exact given name.
    pub fn custom_field_id(&self, name: &str) -> Option<u64> {
        self.custom_fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.id)
    }
}

/// Entry of the instance-wide status catalog (`/issue_statuses.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueStatus {
    pub id: u64,
    pub name: String,
}

/// Looks a status up by its display name, first match wins.
pub fn find_status_id(statuses: &[IssueStatus], name: &str) -> Option<u64> {
    statuses.iter().find(|s| s.name == name).map(|s| s.id)
}

/// Value written into a custom field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomFieldValue {
    pub id: u64,
    pub value: String,
}

/// Partial issue update. Unset members are left out of the request body,
/// so each one can be sent on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_ratio: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomFieldValue>>,
}

impl IssueUpdate {
    /// Moves the issue to `status_id` and marks it 100% done.
    pub fn resolve(status_id: u64) -> Self {
        Self {
            status_id: Some(status_id),
            done_ratio: Some(100),
            ..Self::default()
        }
    }

    /// Appends a journal note.
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            notes: Some(text.into()),
            ..Self::default()
        }
    }

    /// Sets a single custom field.
    pub fn custom_field(id: u64, value: impl Into<String>) -> Self {
        Self {
            custom_fields: Some(vec![CustomFieldValue {
                id,
                value: value.into(),
            }]),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_members_are_not_serialized() {
        let body = serde_json::to_value(IssueUpdate::resolve(3)).unwrap();
        assert_eq!(body, json!({ "status_id": 3, "done_ratio": 100 }));

        let body = serde_json::to_value(IssueUpdate::custom_field(7, "alice")).unwrap();
        assert_eq!(body, json!({ "custom_fields": [{ "id": 7, "value": "alice" }] }));
    }

    #[test]
    fn issue_parses_redmine_shape() {
        let issue: Issue = serde_json::from_value(json!({
            "id": 42,
            "project": { "id": 1, "name": "Demo" },
            "status": { "id": 2, "name": "进行中" },
            "subject": "Crash on start",
            "custom_fields": [
                { "id": 5, "name": "GitLab User", "value": "" },
                { "id": 6, "name": "Tags", "multiple": true, "value": ["a", "b"] }
            ]
        }))
        .unwrap();

        assert_eq!(issue.status.id, 2);
        assert_eq!(issue.custom_field_id("GitLab User"), Some(5));
        assert_eq!(issue.custom_field_id("gitlab user"), None);
    }

    #[test]
    fn status_lookup_is_exact() {
        let statuses = vec![
            IssueStatus { id: 1, name: "新建".into() },
            IssueStatus { id: 3, name: "已解决".into() },
            IssueStatus { id: 5, name: "已关闭".into() },
        ];
        assert_eq!(find_status_id(&statuses, "已解决"), Some(3));
        assert_eq!(find_status_id(&statuses, "Resolved"), None);
    }
}
