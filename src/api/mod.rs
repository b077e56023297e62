//! REST client for the Q&A backend.
//!
//! Free functions over a shared `reqwest::Client` and base URL, one file per
//! resource. `HttpVoteBackend` adapts them to the `VoteBackend` seam.

pub mod analytics;
pub mod comment;
pub mod question;
pub mod vote;

pub use vote::{HttpVoteBackend, RetractMode};

use log::error;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::session::Session;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Adds the bearer token for logged-in sessions.
pub(crate) fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    let request = request.header("Accept", "application/json");
    match token {
        Some(token) => request.header("Authorization", format!("Bearer {}", token)),
        None => request,
    }
}

pub(crate) fn session_token(session: &Session) -> Option<&str> {
    session.token.as_deref()
}

/// Sends `request` and decodes a 2xx JSON body, or reports the rejection.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<T, ApiError> {
    let resp = request.send().await?;
    let resp = check_status(resp, what).await?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        error!("Failed to parse {} response: {}", what, e);
        ApiError::Decode(e.to_string())
    })
}

async fn check_status(resp: Response, what: &str) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let detail = rejection_detail(&body);
    error!("Failed to {} ({}): {}", what, status.as_u16(), detail);
    Err(ApiError::rejected(status.as_u16(), detail))
}

/// The `detail` field of an error body when present, else the raw text.
pub(crate) fn rejection_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.to_owned(),
        },
        _ => body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_extracted_from_fastapi_errors() {
        assert_eq!(rejection_detail(r#"{"detail": "Question not found"}"#), "Question not found");
        assert_eq!(
            rejection_detail(r#"{"detail": [{"loc": ["query", "user_id"]}]}"#),
            r#"[{"loc":["query","user_id"]}]"#
        );
        assert_eq!(rejection_detail("Internal Server Error"), "Internal Server Error");
    }
}
