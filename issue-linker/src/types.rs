/// Commit data the linker needs, already defaulted by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub message: String,
    pub author_name: String,
}

impl CommitInfo {
    /// One-line journal note summarizing the commit.
    pub fn note(&self) -> String {
        format!(
            "Commit by {} ({}): {}",
            self.author_name, self.id, self.message
        )
    }
}

/// Names the linker resolves against the tracker.
#[derive(Debug, Clone)]
pub struct LinkerSettings {
    /// Status the referenced issues are moved to.
    pub resolved_status_name: String,
    /// Custom field that receives the pusher's GitLab username.
    pub user_field_name: String,
}

impl Default for LinkerSettings {
    fn default() -> Self {
        Self {
            resolved_status_name: "已解决".to_string(),
            user_field_name: "GitLab User".to_string(),
        }
    }
}
