//! Status transition, then commit note, then user attribution.
//!
//! The note and the attribution are only written for issues this call
//! actually moved to the resolved status.

use redmine_client::{IssueTracker, IssueUpdate, RedmineError};
use tracing::{error, info, instrument};

use crate::types::CommitInfo;

/// Inputs for resolving one issue from one commit.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub issue_id: &'a str,
    pub resolved_status_id: u64,
    pub commit: &'a CommitInfo,
    /// GitLab username of the pusher.
    pub username: &'a str,
    /// Name of the custom field receiving `username`.
    pub user_field: &'a str,
}

/// Result of [`resolve_issue`].
#[derive(Debug)]
pub enum SyncOutcome {
    /// Status changed; follow-up steps ran.
    Resolved {
        comment: StepOutcome,
        user_field: FieldOutcome,
    },
    /// Issue was already in the resolved status; nothing was written.
    AlreadyResolved,
    /// Sequence aborted before the status changed; nothing was written.
    Failed(RedmineError),
}

#[derive(Debug)]
pub enum StepOutcome {
    Done,
    Failed(RedmineError),
}

#[derive(Debug)]
pub enum FieldOutcome {
    Updated,
    /// Issue has no custom field with the configured name.
    Missing,
    Failed(RedmineError),
}

/// Moves the issue to the resolved status and annotates it.
///
/// 1. fetch the issue; stop if it already has the resolved status
/// 2. set status + 100% done; stop on failure
/// 3. append the commit note
/// 4. write the pusher's username into the attribution field, if the
///    issue has one
///
/// Steps 3 and 4 are independent: a failed note does not prevent the
/// attribution.
#[instrument(
    name = "resolve_issue",
    skip_all,
    fields(issue = %req.issue_id, commit = %req.commit.id)
)]
pub async fn resolve_issue<T: IssueTracker>(tracker: &T, req: &ResolveRequest<'_>) -> SyncOutcome {
    let issue = match tracker.get_issue(req.issue_id).await {
        Ok(issue) => issue,
        Err(error) => {
            error!(%error, "error fetching redmine issue");
            return SyncOutcome::Failed(error);
        }
    };

    if issue.status.id == req.resolved_status_id {
        info!(
            status_id = req.resolved_status_id,
            "issue already in resolved status, skipping note and user field"
        );
        return SyncOutcome::AlreadyResolved;
    }

    let update = IssueUpdate::resolve(req.resolved_status_id);
    if let Err(error) = tracker.update_issue(req.issue_id, &update).await {
        error!(
            %error,
            status_id = req.resolved_status_id,
            "error updating redmine issue status"
        );
        return SyncOutcome::Failed(error);
    }
    info!(
        from = issue.status.id,
        to = req.resolved_status_id,
        "updated redmine issue status"
    );

    let comment = add_commit_note(tracker, req).await;
    let user_field = record_gitlab_user(tracker, req).await;

    SyncOutcome::Resolved {
        comment,
        user_field,
    }
}

async fn add_commit_note<T: IssueTracker>(tracker: &T, req: &ResolveRequest<'_>) -> StepOutcome {
    let note = req.commit.note();
    match tracker
        .update_issue(req.issue_id, &IssueUpdate::note(note.as_str()))
        .await
    {
        Ok(()) => {
            info!(%note, "added comment to redmine issue");
            StepOutcome::Done
        }
        Err(error) => {
            error!(%error, "error adding comment to redmine issue");
            StepOutcome::Failed(error)
        }
    }
}

async fn record_gitlab_user<T: IssueTracker>(
    tracker: &T,
    req: &ResolveRequest<'_>,
) -> FieldOutcome {
    // Re-read: the field list may depend on the tracker/status just set.
    let issue = match tracker.get_issue(req.issue_id).await {
        Ok(issue) => issue,
        Err(error) => {
            error!(%error, field = req.user_field, "error fetching issue for user field");
            return FieldOutcome::Failed(error);
        }
    };

    let Some(field_id) = issue.custom_field_id(req.user_field) else {
        info!(field = req.user_field, "custom field not found on redmine issue, skipping");
        return FieldOutcome::Missing;
    };

    let update = IssueUpdate::custom_field(field_id, req.username);
    match tracker.update_issue(req.issue_id, &update).await {
        Ok(()) => {
            info!(
                field = req.user_field,
                user = req.username,
                "updated redmine user field"
            );
            FieldOutcome::Updated
        }
        Err(error) => {
            error!(%error, field = req.user_field, "error updating redmine user field");
            FieldOutcome::Failed(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redmine_client::testing::{FakeTracker, TrackerCall, TrackerOp, issue};

    const RESOLVED: u64 = 3;
    const USER_FIELD: &str = "GitLab User";

    fn commit() -> CommitInfo {
        CommitInfo {
            id: "a1b2c3".into(),
            message: "fix redmine-#42 null check".into(),
            author_name: "Sun Guangxian".into(),
        }
    }

    fn request(commit: &CommitInfo) -> ResolveRequest<'_> {
        ResolveRequest {
            issue_id: "42",
            resolved_status_id: RESOLVED,
            commit,
            username: "sunguangxian",
            user_field: USER_FIELD,
        }
    }

    #[tokio::test]
    async fn resolves_then_annotates_in_order() {
        let tracker = FakeTracker::new().with_issue(issue(42, 1, &[(9, USER_FIELD)]));
        let commit = commit();

        let outcome = resolve_issue(&tracker, &request(&commit)).await;

        assert!(matches!(
            outcome,
            SyncOutcome::Resolved {
                comment: StepOutcome::Done,
                user_field: FieldOutcome::Updated,
            }
        ));
        assert_eq!(
            tracker.updates_for("42"),
            vec![
                IssueUpdate::resolve(RESOLVED),
                IssueUpdate::note("Commit by Sun Guangxian (a1b2c3): fix redmine-#42 null check"),
                IssueUpdate::custom_field(9, "sunguangxian"),
            ]
        );
        let stored = tracker.issue("42").unwrap();
        assert_eq!(stored.status.id, RESOLVED);
        assert_eq!(stored.custom_fields[0].value, "sunguangxian");
    }

    #[tokio::test]
    async fn already_resolved_issue_is_left_alone_every_time() {
        let tracker = FakeTracker::new().with_issue(issue(42, RESOLVED, &[(9, USER_FIELD)]));
        let commit = commit();

        for _ in 0..2 {
            let outcome = resolve_issue(&tracker, &request(&commit)).await;
            assert!(matches!(outcome, SyncOutcome::AlreadyResolved));
        }

        assert!(tracker.updates_for("42").is_empty());
        assert_eq!(
            tracker.calls(),
            vec![
                TrackerCall::GetIssue { issue_id: "42".into() },
                TrackerCall::GetIssue { issue_id: "42".into() },
            ]
        );
    }

    #[tokio::test]
    async fn second_delivery_of_same_commit_is_a_no_op() {
        let tracker = FakeTracker::new().with_issue(issue(42, 1, &[]));
        let commit = commit();

        assert!(matches!(
            resolve_issue(&tracker, &request(&commit)).await,
            SyncOutcome::Resolved { .. }
        ));
        assert!(matches!(
            resolve_issue(&tracker, &request(&commit)).await,
            SyncOutcome::AlreadyResolved
        ));
        // resolve + note from the first delivery only
        assert_eq!(tracker.updates_for("42").len(), 2);
    }

    #[tokio::test]
    async fn failed_status_update_suppresses_note_and_field() {
        let tracker = FakeTracker::new()
            .with_issue(issue(42, 1, &[(9, USER_FIELD)]))
            .fail_on(TrackerOp::UpdateStatus);
        let commit = commit();

        let outcome = resolve_issue(&tracker, &request(&commit)).await;

        assert!(matches!(outcome, SyncOutcome::Failed(RedmineError::Unprocessable(_))));
        assert_eq!(tracker.updates_for("42"), vec![IssueUpdate::resolve(RESOLVED)]);
        assert_eq!(tracker.calls().len(), 2);
    }

    #[tokio::test]
    async fn unknown_issue_fails_before_any_write() {
        let tracker = FakeTracker::new();
        let commit = commit();

        let outcome = resolve_issue(&tracker, &request(&commit)).await;

        assert!(matches!(outcome, SyncOutcome::Failed(RedmineError::NotFound)));
        assert!(tracker.updates_for("42").is_empty());
    }

    #[tokio::test]
    async fn missing_user_field_still_adds_note() {
        let tracker = FakeTracker::new().with_issue(issue(42, 1, &[(4, "Reviewer")]));
        let commit = commit();

        let outcome = resolve_issue(&tracker, &request(&commit)).await;

        assert!(matches!(
            outcome,
            SyncOutcome::Resolved {
                comment: StepOutcome::Done,
                user_field: FieldOutcome::Missing,
            }
        ));
        let updates = tracker.updates_for("42");
        assert_eq!(updates.len(), 2);
        assert!(updates[1].notes.is_some());
        assert!(updates.iter().all(|u| u.custom_fields.is_none()));
    }

    #[tokio::test]
    async fn failed_note_does_not_block_user_field() {
        let tracker = FakeTracker::new()
            .with_issue(issue(42, 1, &[(9, USER_FIELD)]))
            .fail_on(TrackerOp::AddNote);
        let commit = commit();

        let outcome = resolve_issue(&tracker, &request(&commit)).await;

        assert!(matches!(
            outcome,
            SyncOutcome::Resolved {
                comment: StepOutcome::Failed(_),
                user_field: FieldOutcome::Updated,
            }
        ));
    }
}
