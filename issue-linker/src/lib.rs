mod errors;
pub mod extract;
pub mod sequencer;
mod types;

use redmine_client::{IssueTracker, find_status_id};
use tracing::{debug, error, info, warn};

pub use errors::{ExtractError, LinkerError};
pub use extract::extract_issue_id;
pub use sequencer::{FieldOutcome, ResolveRequest, StepOutcome, SyncOutcome, resolve_issue};
pub use types::{CommitInfo, LinkerSettings};

/// What happened to one commit of a push.
#[derive(Debug)]
pub struct CommitReport {
    pub commit_id: String,
    pub result: CommitResult,
}

#[derive(Debug)]
pub enum CommitResult {
    /// Message carries no issue reference.
    NoReference,
    /// Reference found but the sequencer could not be started.
    Skipped(LinkerError),
    /// Sequencer ran against `issue_id`.
    Synced {
        issue_id: String,
        outcome: SyncOutcome,
    },
}

/// Per-push tally of commit results, for the delivery log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PushSummary {
    pub resolved: usize,
    pub already_resolved: usize,
    pub failed: usize,
    pub skipped: usize,
    pub unreferenced: usize,
}

impl PushSummary {
    pub fn from_reports(reports: &[CommitReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match &report.result {
                CommitResult::NoReference => summary.unreferenced += 1,
                CommitResult::Skipped(_) => summary.skipped += 1,
                CommitResult::Synced { outcome, .. } => match outcome {
                    SyncOutcome::Resolved { .. } => summary.resolved += 1,
                    SyncOutcome::AlreadyResolved => summary.already_resolved += 1,
                    SyncOutcome::Failed(_) => summary.failed += 1,
                },
            }
        }
        summary
    }
}

/// Processes the commits of one push, strictly in the given order.
///
/// For every commit that references an issue the status catalog is
/// fetched again and the configured resolved status looked up by name;
/// if that fails the commit is skipped and the next one processed.
/// Errors never abort the whole push.
pub async fn sync_push_commits<T: IssueTracker>(
    tracker: &T,
    settings: &LinkerSettings,
    username: &str,
    commits: &[CommitInfo],
) -> Vec<CommitReport> {
    info!(user = %username, commits = commits.len(), "sync_push_commits started");

    let mut reports = Vec::with_capacity(commits.len());
    for commit in commits {
        let result = sync_commit(tracker, settings, username, commit).await;
        reports.push(CommitReport {
            commit_id: commit.id.clone(),
            result,
        });
    }

    reports
}

async fn sync_commit<T: IssueTracker>(
    tracker: &T,
    settings: &LinkerSettings,
    username: &str,
    commit: &CommitInfo,
) -> CommitResult {
    let issue_id = match extract_issue_id(&commit.message) {
        Ok(Some(id)) => id,
        Ok(None) => {
            debug!(commit = %commit.id, "no issue reference in commit message");
            return CommitResult::NoReference;
        }
        Err(e) => {
            warn!(commit = %commit.id, error = %e, "unusable issue reference");
            return CommitResult::Skipped(e.into());
        }
    };

    let resolved_status_id = match resolve_status_id(tracker, &settings.resolved_status_name).await
    {
        Ok(id) => id,
        Err(e) => {
            error!(commit = %commit.id, issue = %issue_id, error = %e, "skipping commit");
            return CommitResult::Skipped(e);
        }
    };

    let req = ResolveRequest {
        issue_id,
        resolved_status_id,
        commit,
        username,
        user_field: &settings.user_field_name,
    };
    let outcome = resolve_issue(tracker, &req).await;

    CommitResult::Synced {
        issue_id: issue_id.to_string(),
        outcome,
    }
}

async fn resolve_status_id<T: IssueTracker>(tracker: &T, name: &str) -> Result<u64, LinkerError> {
    let statuses = tracker
        .list_issue_statuses()
        .await
        .map_err(LinkerError::StatusCatalog)?;

    find_status_id(&statuses, name).ok_or_else(|| LinkerError::MissingStatus(name.to_string()))
}
