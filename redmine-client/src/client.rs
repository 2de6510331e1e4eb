//! Redmine REST client (JSON API).
//!
//! Endpoints used:
//!   * GET /issues/:id.json
//!   * PUT /issues/:id.json
//!   * GET /issue_statuses.json

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{RedmineError, RedmineResult};
use crate::tracker::{IssueTracker, TrackerConnector};
use crate::types::{Issue, IssueStatus, IssueUpdate};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Runtime configuration for the Redmine connection.
#[derive(Debug, Clone)]
pub struct RedmineConfig {
    /// Instance root, e.g. "http://redmine.local:3000".
    pub base_url: String,
    /// Upper bound for a single request, connect included.
    pub timeout: Duration,
}

/// Shared HTTP pool plus base URL; hands out per-user clients.
#[derive(Debug, Clone)]
pub struct RedmineConnector {
    http: Client,
    base_url: String,
}

impl RedmineConnector {
    /// Builds the shared HTTP client with a stable user agent and timeout.
    pub fn from_config(cfg: RedmineConfig) -> RedmineResult<Self> {
        let base_url = cfg.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RedmineError::InvalidBaseUrl(cfg.base_url));
        }

        debug!(
            "Initializing Redmine connector: base_url={}, timeout={:?}",
            base_url, cfg.timeout
        );

        let http = Client::builder()
            .user_agent("redmine-relay/0.1")
            .timeout(cfg.timeout)
            .build()?;

        Ok(Self { http, base_url })
    }
}

impl TrackerConnector for RedmineConnector {
    type Tracker = RedmineClient;

    fn connect(&self, api_key: &str) -> RedmineClient {
        RedmineClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            api_key: api_key.to_string(),
        }
    }
}

/// Redmine client acting on behalf of one user.
#[derive(Clone)]
pub struct RedmineClient {
    http: Client,
    base_url: String,
    api_key: String,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for RedmineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedmineClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct IssueEnvelope {
    issue: Issue,
}

#[derive(Serialize)]
struct IssueUpdateEnvelope<'a> {
    issue: &'a IssueUpdate,
}

#[derive(Deserialize)]
struct IssueStatusList {
    issue_statuses: Vec<IssueStatus>,
}

impl RedmineClient {
    fn issue_url(&self, issue_id: &str) -> String {
        format!(
            "{}/issues/{}.json",
            self.base_url,
            urlencoding::encode(issue_id)
        )
    }
}

/// Turns a non-2xx response into an error, keeping Redmine's message.
async fn ensure_success(resp: Response) -> RedmineResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(RedmineError::from_status(status.as_u16(), &body))
}

impl IssueTracker for RedmineClient {
    async fn get_issue(&self, issue_id: &str) -> RedmineResult<Issue> {
        let url = self.issue_url(issue_id);
        debug!("Redmine get_issue: {}", url);

        let resp = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let envelope: IssueEnvelope = ensure_success(resp).await?.json().await?;
        Ok(envelope.issue)
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> RedmineResult<()> {
        let url = self.issue_url(issue_id);
        debug!("Redmine update_issue: {}", url);

        let resp = self
            .http
            .put(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&IssueUpdateEnvelope { issue: update })
            .send()
            .await?;

        // 204 on current Redmine, 200 with an empty body on older ones.
        ensure_success(resp).await?;
        Ok(())
    }

    async fn list_issue_statuses(&self) -> RedmineResult<Vec<IssueStatus>> {
        let url = format!("{}/issue_statuses.json", self.base_url);
        debug!("Redmine list_issue_statuses: {}", url);

        let resp = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let list: IssueStatusList = ensure_success(resp).await?.json().await?;
        Ok(list.issue_statuses)
    }
}
