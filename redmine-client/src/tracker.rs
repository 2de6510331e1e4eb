//! Capability set the relay consumes from an issue tracker.
//!
//! Static dispatch only: the HTTP layer and the sequencer are generic over
//! these traits, so the reqwest client and the in-memory fake plug into the
//! same code paths.

use std::future::Future;

use crate::errors::RedmineResult;
use crate::types::{Issue, IssueStatus, IssueUpdate};

/// Tracker operations bound to one user's credentials.
pub trait IssueTracker: Send + Sync {
    /// Fetches an issue with its status and custom fields.
    fn get_issue(&self, issue_id: &str) -> impl Future<Output = RedmineResult<Issue>> + Send;

    /// Applies a partial update; each member of `update` is optional.
    fn update_issue(
        &self,
        issue_id: &str,
        update: &IssueUpdate,
    ) -> impl Future<Output = RedmineResult<()>> + Send;

    /// Fetches the instance-wide status catalog, in tracker order.
    fn list_issue_statuses(&self) -> impl Future<Output = RedmineResult<Vec<IssueStatus>>> + Send;
}

/// Produces per-user trackers over shared transport.
pub trait TrackerConnector: Clone + Send + Sync + 'static {
    type Tracker: IssueTracker;

    /// Binds a tracker to `api_key`. Performs no I/O.
    fn connect(&self, api_key: &str) -> Self::Tracker;
}
