use log::debug;
use reqwest::Client;

use crate::api::{authorize, send_json};
use crate::error::ApiError;
use crate::models::analytics::{ActionType, LogEventRequest, LogPayload};

pub async fn post_event(
    client: &Client,
    base_url: &str,
    session_id: &str,
    action_type: ActionType,
    payload: &LogPayload,
) -> Result<(), ApiError> {
    let url = format!("{}/_synthetic/log_event", base_url);
    let request = client
        .post(&url)
        .query(&[("session_id", session_id)])
        .json(&LogEventRequest {
            action_type,
            payload,
        });
    send_json::<serde_json::Value>(authorize(request, None), "log event").await?;
    debug!("Logged {:?} event", action_type);
    Ok(())
}
