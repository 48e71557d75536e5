use axum::{async_trait, http::StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use super::dto::{ModelRequest, ModelResponse};
use crate::upstream::{self, UpstreamError};

#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn predict(&self, req: &ModelRequest) -> upstream::Result<ModelResponse>;
}

/// Client for the FastAPI prediction service.
#[derive(Clone)]
pub struct FastApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl FastApiClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POSTs `body` as JSON to `path` and decodes the success body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> upstream::Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.post(url).json(body).send().await?;
        let text = upstream::read_body(resp).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl PredictionApi for FastApiClient {
    async fn predict(&self, req: &ModelRequest) -> upstream::Result<ModelResponse> {
        self.post_json("/api/prediction/predict", req).await
    }
}

/// Maps a FastAPI failure onto the status and text our callers see. Error
/// statuses are relayed with the service's own body.
pub fn relay_error(err: UpstreamError) -> (StatusCode, String) {
    match err {
        UpstreamError::Status { status, body } => {
            warn!(%status, "FastAPI returned an error");
            (status, format!("FastAPI error: {body}"))
        }
        UpstreamError::Decode(e) => {
            warn!(error = %e, "FastAPI answer not understood");
            (StatusCode::BAD_REQUEST, "Invalid response from FastAPI".into())
        }
        e @ UpstreamError::Request(_) => {
            error!(error = %e, "FastAPI unreachable");
            (e.status(), "FastAPI error: service unreachable".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamError;
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ModelRequest {
        ModelRequest {
            datum: "2025-06-12".into(),
            temperatuur: 18.5,
            weersverwachting: "Regen".into(),
        }
    }

    #[tokio::test]
    async fn posts_snake_case_body_and_parses_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prediction/predict"))
            .and(body_json(json!({
                "datum": "2025-06-12",
                "temperatuur": 18.5,
                "weersverwachting": "Regen"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "predictions": {"Plastic": 12, "Glass": 3},
                "confidence_scores": {"Plastic": 0.8},
                "model_used_per_category": {"Plastic": "random_forest"},
                "latitude": 51.589,
                "longitude": 4.776
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = FastApiClient::new(reqwest::Client::new(), &server.uri());
        let resp = client.predict(&request()).await.unwrap();
        assert_eq!(resp.predictions.get("Plastic"), Some(&12));
        assert_eq!(resp.predictions.get("Glass"), Some(&3));
        assert_eq!(resp.latitude, 51.589);
        assert!(resp.confidence_scores.unwrap().get("Glass").is_none());
    }

    #[tokio::test]
    async fn error_status_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prediction/predict"))
            .respond_with(ResponseTemplate::new(422).set_body_string("missing datum"))
            .mount(&server)
            .await;

        let client = FastApiClient::new(reqwest::Client::new(), &server.uri());
        match client.predict(&request()).await.unwrap_err() {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(body, "missing datum");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_answer_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prediction/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = FastApiClient::new(reqwest::Client::new(), &server.uri());
        let err = client.predict(&request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn relayed_errors() {
        let (status, text) = relay_error(UpstreamError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "model loading".into(),
        });
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(text, "FastAPI error: model loading");

        let decode = serde_json::from_str::<ModelResponse>("[]").unwrap_err();
        assert_eq!(
            relay_error(UpstreamError::Decode(decode)),
            (StatusCode::BAD_REQUEST, "Invalid response from FastAPI".to_string())
        );
    }
}
