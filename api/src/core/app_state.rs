use issue_linker::LinkerSettings;
use redmine_client::{RedmineConfig, RedmineConnector, RedmineResult, TrackerConnector};

use crate::core::config::{AppConfig, CredentialMap};

/// Shared state for all HTTP handlers. Never mutated after startup.
#[derive(Debug, Clone)]
pub struct AppState<C> {
    /// Hands out Redmine clients bound to one user's API key.
    pub connector: C,
    /// GitLab username -> Redmine API key.
    pub credentials: CredentialMap,
    /// Status and custom field names used when resolving issues.
    pub linker: LinkerSettings,
}

impl<C: TrackerConnector> AppState<C> {
    pub fn new(connector: C, credentials: CredentialMap, linker: LinkerSettings) -> Self {
        Self {
            connector,
            credentials,
            linker,
        }
    }
}

impl AppState<RedmineConnector> {
    /// Build the production state backed by the reqwest Redmine client.
    pub fn from_config(cfg: &AppConfig) -> RedmineResult<Self> {
        let connector = RedmineConnector::from_config(RedmineConfig {
            base_url: cfg.redmine_url.clone(),
            timeout: cfg.request_timeout,
        })?;

        Ok(Self::new(
            connector,
            cfg.credentials.clone(),
            LinkerSettings {
                resolved_status_name: cfg.resolved_status_name.clone(),
                user_field_name: cfg.user_field_name.clone(),
            },
        ))
    }
}
