use issue_linker::CommitInfo;
use serde::Deserialize;

pub const UNKNOWN_USER: &str = "Unknown User";
const UNKNOWN_AUTHOR: &str = "Unknown Author";
const NO_MESSAGE: &str = "No commit message";
const NO_COMMIT_ID: &str = "No commit ID";

/// GitLab webhook body, reduced to the push-event fields the relay reads.
///
/// Every field is optional so that any JSON object parses; the route
/// decides what to do with missing values.
#[derive(Debug, Default, Deserialize)]
pub struct PushEventRequest {
    /// "push" for push events; other hooks are ignored.
    #[serde(default)]
    pub object_kind: Option<String>,
    /// GitLab username of the pusher.
    #[serde(default)]
    pub user_username: Option<String>,
    /// Commits of the push, oldest first as sent by GitLab.
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

impl PushEventRequest {
    pub fn is_push(&self) -> bool {
        self.object_kind.as_deref() == Some("push")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PushCommit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<PushCommitAuthor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PushCommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<PushCommit> for CommitInfo {
    fn from(c: PushCommit) -> Self {
        CommitInfo {
            id: c.id.unwrap_or_else(|| NO_COMMIT_ID.into()),
            message: c.message.unwrap_or_else(|| NO_MESSAGE.into()),
            author_name: c
                .author
                .and_then(|a| a.name)
                .unwrap_or_else(|| UNKNOWN_AUTHOR.into()),
        }
    }
}
