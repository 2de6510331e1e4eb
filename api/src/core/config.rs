use std::{collections::HashMap, time::Duration};

use thiserror::Error;

const DEFAULT_API_ADDRESS: &str = "0.0.0.0:5000";
const DEFAULT_RESOLVED_STATUS: &str = "已解决";
const DEFAULT_USER_FIELD: &str = "GitLab User";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors, all fatal at boot.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("invalid entry in REDMINE_API_KEYS (expected `user=key`): `{0}`")]
    InvalidCredential(String),

    #[error("duplicate gitlab user in REDMINE_API_KEYS: `{0}`")]
    DuplicateUser(String),

    #[error("REDMINE_API_KEYS contains no credentials")]
    NoCredentials,

    #[error("REDMINE_TIMEOUT_SECS must be a positive number of seconds, got `{0}`")]
    InvalidTimeout(String),
}

/// Read-only GitLab username -> Redmine API key mapping.
#[derive(Clone, Default)]
pub struct CredentialMap {
    keys: HashMap<String, String>,
}

impl CredentialMap {
    /// Parses `user=key` pairs separated by commas. Blank entries are skipped.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut keys = HashMap::new();

        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (user, key) = entry
                .split_once('=')
                .map(|(u, k)| (u.trim(), k.trim()))
                .filter(|(u, k)| !u.is_empty() && !k.is_empty())
                .ok_or_else(|| ConfigError::InvalidCredential(entry.to_string()))?;

            if keys.insert(user.to_string(), key.to_string()).is_some() {
                return Err(ConfigError::DuplicateUser(user.to_string()));
            }
        }

        if keys.is_empty() {
            return Err(ConfigError::NoCredentials);
        }

        Ok(Self { keys })
    }

    /// API key of `username`, matched exactly.
    pub fn api_key(&self, username: &str) -> Option<&str> {
        self.keys.get(username).map(String::as_str)
    }
}

// Usernames only; keys never reach the logs.
impl std::fmt::Debug for CredentialMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut users: Vec<_> = self.keys.keys().collect();
        users.sort();
        f.debug_struct("CredentialMap").field("users", &users).finish()
    }
}

/// Process configuration, fixed at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address, e.g. "0.0.0.0:5000".
    pub api_address: String,
    /// Redmine instance root.
    pub redmine_url: String,
    pub credentials: CredentialMap,
    /// Status name referenced issues are moved to.
    pub resolved_status_name: String,
    /// Custom field that receives the pusher's username.
    pub user_field_name: String,
    /// Per-request timeout for Redmine calls.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let redmine_url = get("REDMINE_URL").ok_or(ConfigError::MissingEnv("REDMINE_URL"))?;
        let credentials = CredentialMap::parse(
            &get("REDMINE_API_KEYS").ok_or(ConfigError::MissingEnv("REDMINE_API_KEYS"))?,
        )?;

        let request_timeout = match get("REDMINE_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        Ok(Self {
            api_address: get("API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.into()),
            redmine_url,
            credentials,
            resolved_status_name: get("REDMINE_RESOLVED_STATUS")
                .unwrap_or_else(|| DEFAULT_RESOLVED_STATUS.into()),
            user_field_name: get("REDMINE_USER_FIELD")
                .unwrap_or_else(|| DEFAULT_USER_FIELD.into()),
            request_timeout,
        })
    }
}
