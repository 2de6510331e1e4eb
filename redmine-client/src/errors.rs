//! Crate-wide error type for the Redmine adapter.

use serde::Deserialize;
use thiserror::Error;

/// Convenient alias for adapter results.
pub type RedmineResult<T> = Result<T, RedmineError>;

/// Single failure signal surfaced by every tracker call.
///
/// Variants only make the log line more descriptive; callers treat all of
/// them the same way and never retry.
#[derive(Debug, Error)]
pub enum RedmineError {
    /// Unauthorized (HTTP 401), usually a wrong API key.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404), e.g. an unknown issue id.
    #[error("not found")]
    NotFound,

    /// Validation failure reported by Redmine (HTTP 422), e.g. an invalid status.
    #[error("rejected by redmine: {0}")]
    Unprocessable(String),

    /// Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other non-2xx status.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Request did not finish within the configured timeout.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of the Redmine response.
    #[error("invalid redmine response: {0}")]
    InvalidResponse(String),

    /// Base URL is empty or not an http(s) URL.
    #[error("invalid redmine base url: {0}")]
    InvalidBaseUrl(String),
}

/// Body Redmine returns alongside a 422.
#[derive(Debug, Deserialize)]
struct ErrorList {
    #[serde(default)]
    errors: Vec<String>,
}

impl RedmineError {
    /// Maps a non-2xx status (and its body, if any) into an error.
    pub fn from_status(code: u16, body: &str) -> Self {
        match code {
            401 => RedmineError::Unauthorized,
            403 => RedmineError::Forbidden,
            404 => RedmineError::NotFound,
            422 => {
                let message = serde_json::from_str::<ErrorList>(body)
                    .ok()
                    .filter(|l| !l.errors.is_empty())
                    .map(|l| l.errors.join("; "))
                    .unwrap_or_else(|| body.trim().to_string());
                RedmineError::Unprocessable(message)
            }
            500..=599 => RedmineError::Server(code),
            _ => RedmineError::HttpStatus(code),
        }
    }
}

impl From<reqwest::Error> for RedmineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return RedmineError::Timeout;
        }

        if let Some(status) = e.status() {
            return RedmineError::from_status(status.as_u16(), "");
        }

        if e.is_decode() {
            return RedmineError::InvalidResponse(e.to_string());
        }

        RedmineError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_joined() {
        let err = RedmineError::from_status(
            422,
            r#"{"errors":["Status is invalid","Done is not a number"]}"#,
        );
        assert_eq!(
            err.to_string(),
            "rejected by redmine: Status is invalid; Done is not a number"
        );
    }

    #[test]
    fn unparsable_422_body_is_kept_verbatim() {
        let err = RedmineError::from_status(422, "  nope \n");
        assert!(matches!(err, RedmineError::Unprocessable(ref m) if m == "nope"));
    }

    #[test]
    fn status_codes_map_to_variants() {
        assert!(matches!(RedmineError::from_status(401, ""), RedmineError::Unauthorized));
        assert!(matches!(RedmineError::from_status(404, ""), RedmineError::NotFound));
        assert!(matches!(RedmineError::from_status(503, ""), RedmineError::Server(503)));
        assert!(matches!(RedmineError::from_status(409, ""), RedmineError::HttpStatus(409)));
    }
}
