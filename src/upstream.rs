use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Failure talking to one of the external services (Open-Meteo, FastAPI,
/// Nominatim).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Status to relay to our own caller.
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Request(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            UpstreamError::Request(_) => StatusCode::BAD_GATEWAY,
            UpstreamError::Decode(_) => StatusCode::BAD_REQUEST,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Reads the body and turns a non-success status into `UpstreamError::Status`.
pub async fn read_body(resp: reqwest::Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            body,
        });
    }
    Ok(body)
}

pub fn http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("WasteWatchAI/1.0")
        .build()?;
    Ok(client)
}
