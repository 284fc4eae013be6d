//! Client configuration, read from the environment (`.env` is loaded by
//! `main` before this runs).

use std::time::Duration;

use crate::context::OwnerContext;
use crate::errors::AppError;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TOPIC_PREFIX: &str = "/topic/chat/room/";
const DEFAULT_SEND_PREFIX: &str = "/app/chat/room/";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub chat_ws_url: String,
    /// Destination prefix for room subscriptions; the room id is appended.
    pub chat_topic_prefix: String,
    /// Destination prefix for outgoing chat lines; the room id is appended.
    pub chat_send_prefix: String,
    pub http_timeout: Duration,
    pub owner: OwnerContext,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            chat_ws_url: derive_ws_url(&api_base_url),
            api_base_url,
            chat_topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            chat_send_prefix: DEFAULT_SEND_PREFIX.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            owner: OwnerContext::anonymous(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let base = lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::new(base);

        if let Some(url) = lookup("CHAT_WS_URL") {
            config.chat_ws_url = url;
        }
        if let Some(prefix) = lookup("CHAT_TOPIC_PREFIX") {
            config.chat_topic_prefix = prefix;
        }
        if let Some(prefix) = lookup("CHAT_SEND_PREFIX") {
            config.chat_send_prefix = prefix;
        }
        if let Some(raw) = lookup("HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::invalid_config("HTTP_TIMEOUT_SECS", raw.clone()))?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("OWNER_ID") {
            config.owner = OwnerContext::from_raw(&raw);
        }
        Ok(config)
    }

    pub fn topic_for(&self, room_id: i64) -> String {
        format!("{}{room_id}", self.chat_topic_prefix)
    }

    pub fn send_destination_for(&self, room_id: i64) -> String {
        format!("{}{room_id}", self.chat_send_prefix)
    }
}

fn derive_ws_url(api_base_url: &str) -> String {
    let ws_base = api_base_url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1);
    format!("{ws_base}/ws")
}
