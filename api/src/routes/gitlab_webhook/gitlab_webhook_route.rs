use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, StatusCode},
};
use issue_linker::{CommitInfo, PushSummary, sync_push_commits};
use redmine_client::TrackerConnector;
use tracing::{debug, info, instrument, warn};

use crate::{
    core::app_state::AppState,
    routes::gitlab_webhook::push_event_request::{PushEventRequest, UNKNOWN_USER},
};

/// Fixed acknowledgement body, sent for every delivery.
pub const WEBHOOK_ACK: &str = "Webhook received succ!";

/// Largest delivery read into memory (25 MiB, GitLab's own webhook payload
/// cap). Bigger bodies are dropped and still acknowledged.
pub const MAX_WEBHOOK_BODY: usize = 25 * 1024 * 1024;

/// POST /
///
/// GitLab webhook receiver. Push events whose commits reference Redmine
/// issues (`fix redmine-#42`) move those issues to the resolved status.
///
/// Always answers 200 with [`WEBHOOK_ACK`]: oversized or malformed
/// payloads, other hook kinds, unknown users and Redmine failures are
/// logged only. The body is taken as a raw stream so axum's default body
/// limit never turns a delivery into a 413.
#[instrument(name = "gitlab_webhook_route", skip_all)]
pub async fn gitlab_webhook_route<C: TrackerConnector>(
    State(state): State<Arc<AppState<C>>>,
    headers: HeaderMap,
    body: Body,
) -> (StatusCode, &'static str) {
    if let Some(event) = headers.get("X-Gitlab-Event").and_then(|h| h.to_str().ok()) {
        debug!(%event, "gitlab event header attached");
    }

    match to_bytes(body, MAX_WEBHOOK_BODY).await {
        Ok(bytes) => handle_delivery(&state, &bytes).await,
        Err(e) => warn!(
            error = %e,
            limit = MAX_WEBHOOK_BODY,
            "ignoring unreadable or oversized webhook body"
        ),
    }

    (StatusCode::OK, WEBHOOK_ACK)
}

async fn handle_delivery<C: TrackerConnector>(state: &AppState<C>, body: &[u8]) {
    let event: PushEventRequest = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "ignoring malformed webhook payload");
            return;
        }
    };

    if !event.is_push() {
        debug!(kind = ?event.object_kind, "ignoring non-push event");
        return;
    }

    let username = event.user_username.as_deref().unwrap_or(UNKNOWN_USER);

    // --- Resolve Redmine credentials -------------------------------------------
    let Some(api_key) = state.credentials.api_key(username) else {
        info!(user = %username, "no redmine api key for gitlab user, ignoring push");
        return;
    };

    let commits: Vec<CommitInfo> = event.commits.into_iter().map(CommitInfo::from).collect();
    info!(user = %username, commits = commits.len(), "processing push event");

    let tracker = state.connector.connect(api_key);
    let reports = sync_push_commits(&tracker, &state.linker, username, &commits).await;

    let summary = PushSummary::from_reports(&reports);
    info!(
        user = %username,
        resolved = summary.resolved,
        already_resolved = summary.already_resolved,
        failed = summary.failed,
        skipped = summary.skipped,
        unreferenced = summary.unreferenced,
        "push event processed"
    );
}
