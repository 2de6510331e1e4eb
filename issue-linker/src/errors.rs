use redmine_client::RedmineError;
use thiserror::Error;

/// Commit message names a keyword but the reference is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("`{keyword} redmine-#` is not followed by an issue id")]
    MissingIssueId { keyword: &'static str },
}

/// Reasons a referenced commit never reaches the sequencer.
#[derive(Debug, Error)]
pub enum LinkerError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("failed to fetch issue statuses: {0}")]
    StatusCatalog(#[source] RedmineError),

    #[error("issue status `{0}` not found in redmine")]
    MissingStatus(String),
}
