use thiserror::Error;

/// Failures of the transport layer. Normalization and reduction never fail;
/// everything that can go wrong talking to the backend ends up here.
#[derive(Debug, Error)]
pub enum AppError {
    // ── REST transport ───────────────────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Backend rejected the request: {msg}")]
    Rejected { msg: String },

    // ── Chat socket ──────────────────────────────────────────────────────────
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Malformed STOMP frame: {0}")]
    StompFrame(String),

    #[error("STOMP broker error: {message}")]
    StompError { message: String },

    #[error("Chat subscription closed during {stage}")]
    SubscriptionClosed { stage: &'static str },

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfig { key: String, value: String },
}

impl AppError {
    pub fn stomp_frame(message: impl Into<String>) -> Self {
        AppError::StompFrame(message.into())
    }

    pub fn invalid_config(key: &str, value: impl Into<String>) -> Self {
        AppError::InvalidConfig {
            key: key.to_string(),
            value: value.into(),
        }
    }

    /// Network or socket trouble, as opposed to a backend verdict.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Http(_)
                | AppError::WebSocket(_)
                | AppError::SubscriptionClosed { .. }
                | AppError::Status { .. }
        )
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, AppError::Rejected { .. } | AppError::StompError { .. })
    }
}
