//! Agent configuration, read from `QA_*` environment variables.

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::api::{RetractMode, DEFAULT_API_URL};
use crate::models::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Backend base URL, without trailing slash.
    pub api_url: String,
    pub user_id: i64,
    pub token: Option<String>,
    /// Question shown on startup.
    pub question_id: i64,
    pub retract_mode: RetractMode,
    pub analytics_enabled: bool,
    /// `None` disables the HTTP timeout.
    pub request_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            user_id: 1,
            token: None,
            question_id: 1,
            retract_mode: RetractMode::UndoFlag,
            analytics_enabled: true,
            request_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        if let Some(url) = var("QA_API_URL") {
            config.api_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(user_id) = var("QA_USER_ID") {
            config.user_id = user_id
                .parse()
                .with_context(|| format!("QA_USER_ID must be an integer, got '{}'", user_id))?;
        }
        config.token = var("QA_TOKEN");
        if let Some(question_id) = var("QA_QUESTION_ID") {
            config.question_id = question_id.parse().with_context(|| {
                format!("QA_QUESTION_ID must be an integer, got '{}'", question_id)
            })?;
        }
        if let Some(mode) = var("QA_RETRACT_MODE") {
            config.retract_mode = mode
                .parse()
                .map_err(|e| anyhow!("QA_RETRACT_MODE: {}", e))?;
        }
        if let Some(flag) = var("QA_ANALYTICS") {
            config.analytics_enabled = parse_flag(&flag)
                .ok_or_else(|| anyhow!("QA_ANALYTICS must be true or false, got '{}'", flag))?;
        }
        if let Some(secs) = var("QA_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().with_context(|| {
                format!("QA_REQUEST_TIMEOUT_SECS must be a whole number, got '{}'", secs)
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn session(&self) -> Session {
        match &self.token {
            Some(token) => Session::new(self.user_id).with_token(token.clone()),
            None => Session::new(self.user_id),
        }
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to build HTTP client")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AgentConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AgentConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(load(&[]).unwrap(), AgentConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = load(&[
            ("QA_API_URL", "http://qa.example:9000/"),
            ("QA_USER_ID", "42"),
            ("QA_TOKEN", "secret"),
            ("QA_QUESTION_ID", "7"),
            ("QA_RETRACT_MODE", "opposite"),
            ("QA_ANALYTICS", "off"),
            ("QA_REQUEST_TIMEOUT_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "http://qa.example:9000");
        assert_eq!(config.user_id, 42);
        assert_eq!(config.question_id, 7);
        assert_eq!(config.retract_mode, RetractMode::OppositeDirection);
        assert!(!config.analytics_enabled);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.session(), Session::new(42).with_token("secret"));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("QA_USER_ID", "alice")]).unwrap_err();
        assert!(err.to_string().contains("QA_USER_ID"));

        let err = load(&[("QA_RETRACT_MODE", "sideways")]).unwrap_err();
        assert!(err.to_string().contains("QA_RETRACT_MODE"));

        let err = load(&[("QA_ANALYTICS", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("QA_ANALYTICS"));
    }

    #[test]
    fn blank_token_is_anonymous() {
        let config = load(&[("QA_TOKEN", "  ")]).unwrap();
        assert_eq!(config.token, None);
    }
}
