//! In-memory tracker for tests.
//!
//! `FakeTracker` is both the connector and the per-user tracker. Clones
//! share state, so a test keeps one handle to inspect the calls made
//! through the copy it handed to the code under test.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::{RedmineError, RedmineResult};
use crate::tracker::{IssueTracker, TrackerConnector};
use crate::types::{CustomField, Issue, IssueStatus, IssueStatusRef, IssueUpdate};

/// Record of one call received by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    Connect { api_key: String },
    GetIssue { issue_id: String },
    UpdateIssue { issue_id: String, update: IssueUpdate },
    ListIssueStatuses,
}

/// Operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerOp {
    GetIssue,
    /// Update carrying `status_id`.
    UpdateStatus,
    /// Update carrying `notes` and no status.
    AddNote,
    /// Update carrying only `custom_fields`.
    SetCustomField,
    ListIssueStatuses,
}

impl TrackerOp {
    fn of_update(update: &IssueUpdate) -> Self {
        if update.status_id.is_some() {
            TrackerOp::UpdateStatus
        } else if update.notes.is_some() {
            TrackerOp::AddNote
        } else {
            TrackerOp::SetCustomField
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    issues: HashMap<String, Issue>,
    statuses: Vec<IssueStatus>,
    failing: HashSet<TrackerOp>,
    calls: Vec<TrackerCall>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeTracker {
    state: Arc<Mutex<FakeState>>,
}

/// Builds an issue with the given status and `(id, name)` custom fields.
pub fn issue(id: u64, status_id: u64, fields: &[(u64, &str)]) -> Issue {
    Issue {
        id,
        status: IssueStatusRef {
            id: status_id,
            name: String::new(),
        },
        custom_fields: fields
            .iter()
            .map(|(fid, name)| CustomField {
                id: *fid,
                name: (*name).to_string(),
                value: serde_json::Value::String(String::new()),
            })
            .collect(),
    }
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_statuses<'a>(self, statuses: impl IntoIterator<Item = (u64, &'a str)>) -> Self {
        self.lock().statuses = statuses
            .into_iter()
            .map(|(id, name)| IssueStatus {
                id,
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_issue(self, issue: Issue) -> Self {
        self.lock().issues.insert(issue.id.to_string(), issue);
        self
    }

    pub fn fail_on(self, op: TrackerOp) -> Self {
        self.lock().failing.insert(op);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<TrackerCall> {
        self.lock().calls.clone()
    }

    /// Updates sent for one issue, in order.
    pub fn updates_for(&self, issue_id: &str) -> Vec<IssueUpdate> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                TrackerCall::UpdateIssue { issue_id: id, update } if id == issue_id => {
                    Some(update.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Current stored state of an issue.
    pub fn issue(&self, issue_id: &str) -> Option<Issue> {
        self.lock().issues.get(issue_id).cloned()
    }

    fn check(state: &FakeState, op: TrackerOp) -> RedmineResult<()> {
        if state.failing.contains(&op) {
            return Err(RedmineError::Unprocessable(format!("injected failure: {op:?}")));
        }
        Ok(())
    }
}

impl TrackerConnector for FakeTracker {
    type Tracker = FakeTracker;

    fn connect(&self, api_key: &str) -> FakeTracker {
        self.lock().calls.push(TrackerCall::Connect {
            api_key: api_key.to_string(),
        });
        self.clone()
    }
}

impl IssueTracker for FakeTracker {
    async fn get_issue(&self, issue_id: &str) -> RedmineResult<Issue> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::GetIssue {
            issue_id: issue_id.to_string(),
        });
        Self::check(&state, TrackerOp::GetIssue)?;
        state.issues.get(issue_id).cloned().ok_or(RedmineError::NotFound)
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> RedmineResult<()> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::UpdateIssue {
            issue_id: issue_id.to_string(),
            update: update.clone(),
        });
        Self::check(&state, TrackerOp::of_update(update))?;

        let issue = state.issues.get_mut(issue_id).ok_or(RedmineError::NotFound)?;
        if let Some(status_id) = update.status_id {
            issue.status.id = status_id;
        }
        for value in update.custom_fields.iter().flatten() {
            match issue.custom_fields.iter_mut().find(|f| f.id == value.id) {
                Some(field) => field.value = serde_json::Value::String(value.value.clone()),
                None => {
                    return Err(RedmineError::Unprocessable(format!(
                        "unknown custom field {}",
                        value.id
                    )));
                }
            }
        }
        Ok(())
    }

    async fn list_issue_statuses(&self) -> RedmineResult<Vec<IssueStatus>> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::ListIssueStatuses);
        Self::check(&state, TrackerOp::ListIssueStatuses)?;
        Ok(state.statuses.clone())
    }
}
