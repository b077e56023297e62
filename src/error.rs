//! Error types shared by the backend client and the vote coordinators.

use crate::models::vote::VoteSubject;
use thiserror::Error;

/// Failure of a single backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS, ...
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The response body could not be parsed.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("{0} is not tracked by this view")]
    UnknownSubject(VoteSubject),

    #[error("comment #{0} is not tracked by this view")]
    UnknownComment(i64),

    /// The optimistic update was rolled back.
    #[error("vote on {subject} failed: {source}")]
    Backend {
        subject: VoteSubject,
        #[source]
        source: ApiError,
    },

    #[error("vote on comment #{comment_id} failed: {source}")]
    CommentBackend {
        comment_id: i64,
        #[source]
        source: ApiError,
    },
}
