//! Domain-specific errors.

use thiserror::Error;

/// Failures surfaced while resolving or fetching a gist preview.
///
/// The fetch kinds stay distinct so callers can present different copy for each.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("gist not found")]
    NotFound,
    #[error("GitHub API rate limit exceeded, try again later")]
    RateLimited,
    #[error("failed to fetch gist from the GitHub API: {reason}")]
    FetchFailed { status: Option<u16>, reason: String },
    #[error("invalid gist URL or ID: '{0}'")]
    InvalidIdentifier(String),
}

impl PreviewError {
    pub(crate) fn fetch_failed(reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            status: None,
            reason: reason.into(),
        }
    }
}
