use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::generator::Detection;
use crate::{trash::dto::TrashItem, upstream::{self, UpstreamError}};

const MAX_ATTEMPTS: u32 = 3;
const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("still unauthorized after {0} attempts")]
    Unauthorized(u32),
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoginAnswer {
    #[serde(alias = "accessToken")]
    access_token: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Posts detections to the backend, logging in first when credentials are
/// configured. The token is cached for an hour and dropped on a 401.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
    token: Mutex<Option<CachedToken>>,
    backoff: Duration,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str, credentials: Option<(String, String)>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
            backoff: Duration::from_secs(1),
        }
    }

    /// Base delay between failed attempts; attempt `n` waits `n * backoff`.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn login(&self, email: &str, password: &str) -> upstream::Result<String> {
        info!(email, "logging in");
        let resp = self
            .http
            .post(format!("{}/api/Auth/login", self.base_url))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let body = upstream::read_body(resp).await?;
        let answer: LoginAnswer = serde_json::from_str(&body)?;
        Ok(answer.access_token)
    }

    async fn bearer(&self) -> upstream::Result<Option<String>> {
        let Some((email, password)) = &self.credentials else {
            return Ok(None);
        };
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(Some(token.value.clone()));
        }
        let value = self.login(email, password).await?;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + TOKEN_LIFETIME,
        });
        Ok(Some(value))
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }

    async fn try_post(&self, url: &str, detection: &Detection) -> upstream::Result<reqwest::Response> {
        let mut req = self.http.post(url).json(detection);
        if let Some(token) = self.bearer().await? {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    /// Posts one detection, retrying after a 401 and backing off after
    /// transport or login failures.
    pub async fn post_detection(&self, detection: &Detection) -> Result<TrashItem, ClientError> {
        let url = format!("{}/api/TrashItems/dummy", self.base_url);
        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_post(&url, detection).await {
                Ok(resp) if resp.status() == reqwest::StatusCode::UNAUTHORIZED => {
                    warn!(attempt, "unauthorized, dropping cached token");
                    self.forget_token().await;
                }
                Ok(resp) => {
                    let body = upstream::read_body(resp).await?;
                    let item: TrashItem = serde_json::from_str(&body).map_err(UpstreamError::from)?;
                    debug!(id = %item.id, litter_type = %item.litter_type, "detection posted");
                    return Ok(item);
                }
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(attempt, error = %e, "post failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ClientError::Unauthorized(MAX_ATTEMPTS))
    }
}

impl ClientError {
    pub fn status(&self) -> StatusCode {
        match self {
            ClientError::Upstream(e) => e.status(),
            ClientError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}
