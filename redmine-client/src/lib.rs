//! Thin adapter over the Redmine REST API.
//!
//! Exposes the three calls the relay needs (fetch issue, update issue,
//! list statuses) behind the [`IssueTracker`] trait, plus a reqwest-backed
//! implementation and an in-memory one for tests.

mod client;
mod errors;
mod tracker;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{RedmineClient, RedmineConfig, RedmineConnector};
pub use errors::{RedmineError, RedmineResult};
pub use tracker::{IssueTracker, TrackerConnector};
pub use types::*;
