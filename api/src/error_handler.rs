use redmine_client::RedmineError;
use thiserror::Error;

use crate::core::config::ConfigError;

/// Public application error type.
///
/// Only boot and server failures end up here; webhook processing errors are
/// logged and never turned into HTTP errors.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize redmine client: {0}")]
    Redmine(#[from] RedmineError),

    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),
}

/// Handy result alias used at the crate boundary.
pub type AppResult<T> = Result<T, AppError>;
