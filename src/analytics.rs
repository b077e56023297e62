//! Fire-and-forget analytics event logger.
//!
//! Events are posted on the runtime in the background; failures are logged and
//! never reach the caller.

use log::error;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::api::analytics::post_event;
use crate::models::analytics::{ActionType, Coordinates, LogPayload};

/// Session id sent with every event: the auth token for logged-in viewers,
/// otherwise a generated anonymous id.
pub fn analytics_session_id(token: Option<&str>) -> String {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        return token.to_owned();
    }
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("anonymous_{}_{}", millis, suffix)
}

#[derive(Clone)]
pub struct AnalyticsLogger {
    client: Client,
    base_url: String,
    session_id: String,
    page_url: Arc<Mutex<String>>,
    runtime: Handle,
    enabled: bool,
}

impl AnalyticsLogger {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        session_id: impl Into<String>,
        runtime: Handle,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            session_id: session_id.into(),
            page_url: Arc::new(Mutex::new(String::new())),
            runtime,
            enabled: true,
        }
    }

    /// A logger that drops every event.
    pub fn disabled(runtime: Handle) -> Self {
        Self {
            enabled: false,
            ..Self::new(Client::new(), String::new(), String::new(), runtime)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn set_page_url(&self, url: impl Into<String>) {
        *self.page_url.lock().unwrap_or_else(|p| p.into_inner()) = url.into();
    }

    pub fn page_url(&self) -> String {
        self.page_url.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Posts the event in the background. `None` when the logger is disabled.
    pub fn log_event(&self, action_type: ActionType, payload: LogPayload) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let session_id = self.session_id.clone();
        Some(self.runtime.spawn(async move {
            if let Err(e) = post_event(&client, &base_url, &session_id, action_type, &payload).await
            {
                error!("Error logging {:?} action: {}", action_type, e);
            }
        }))
    }

    pub fn log_click(
        &self,
        element_id: &str,
        text: &str,
        coordinates: Option<Coordinates>,
    ) -> Option<JoinHandle<()>> {
        let payload = LogPayload::click(self.page_url(), element_id, text, coordinates);
        self.log_event(ActionType::Click, payload)
    }

    pub fn log_key_press(&self, element_id: &str, text: &str, key: &str) -> Option<JoinHandle<()>> {
        let payload = LogPayload::key_press(self.page_url(), element_id, text, key);
        self.log_event(ActionType::KeyPress, payload)
    }

    pub fn log_hover(&self, element_id: &str, text: &str) -> Option<JoinHandle<()>> {
        let payload = LogPayload::hover(self.page_url(), element_id, text);
        self.log_event(ActionType::Hover, payload)
    }

    pub fn log_scroll(&self, text: &str, scroll_x: f32, scroll_y: f32) -> Option<JoinHandle<()>> {
        let payload = LogPayload::scroll(self.page_url(), text, scroll_x, scroll_y);
        self.log_event(ActionType::Scroll, payload)
    }

    pub fn log_go_to_url(&self, text: &str, target_url: &str) -> Option<JoinHandle<()>> {
        let payload = LogPayload::go_to_url(self.page_url(), text, target_url);
        self.log_event(ActionType::GoToUrl, payload)
    }

    pub fn log_go_back(&self, text: &str) -> Option<JoinHandle<()>> {
        let payload = LogPayload::navigation(self.page_url(), text);
        self.log_event(ActionType::GoBack, payload)
    }

    pub fn log_go_forward(&self, text: &str) -> Option<JoinHandle<()>> {
        let payload = LogPayload::navigation(self.page_url(), text);
        self.log_event(ActionType::GoForward, payload)
    }

    pub fn log_custom(
        &self,
        custom_action: &str,
        text: &str,
        data: HashMap<String, serde_json::Value>,
    ) -> Option<JoinHandle<()>> {
        self.log_event(ActionType::Custom, LogPayload::custom(custom_action, text, data))
    }
}
