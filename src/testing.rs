//! In-memory stores and canned upstream clients for tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use axum::{async_trait, http::StatusCode};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    analytics::{
        correlation::{CorrelationApi, CorrelationData, CorrelationRequest},
        geocode::{Address, ReverseGeocoder},
        locations::location_key,
    },
    auth::{
        repo::UserStore,
        repo_types::{User, UserClaim},
    },
    config::{AppConfig, JwtConfig, UpstreamConfig},
    predictions::{
        dto::{ModelRequest, ModelResponse, PredictionResult},
        model_api::PredictionApi,
        repo::{PredictionStore, TEMP_TOLERANCE},
    },
    trash::{
        dto::{ItemSource, TrashItem},
        repo::TrashStore,
    },
    upstream::{self, UpstreamError},
    weather::{
        dto::WeatherData,
        open_meteo::{Current, Daily, DailyQuery, WeatherApi},
        repo::WeatherStore,
    },
};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test".into(),
            audience: "test".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        },
        upstream: UpstreamConfig {
            open_meteo_url: "http://open-meteo.test".into(),
            fastapi_url: "http://fastapi.test".into(),
            nominatim_url: "http://nominatim.test".into(),
            timeout_secs: 5,
        },
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    claims: Mutex<Vec<UserClaim>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            anyhow::bail!("duplicate email");
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            email_confirmed: false,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn add_claim(&self, claim: &UserClaim) -> anyhow::Result<()> {
        self.claims.lock().unwrap().push(claim.clone());
        Ok(())
    }

    async fn claims(&self, user_id: Uuid) -> anyhow::Result<Vec<UserClaim>> {
        let claims = self.claims.lock().unwrap();
        Ok(claims.iter().filter(|c| c.user_id == user_id).cloned().collect())
    }

    async fn remove_claim(&self, claim: &UserClaim) -> anyhow::Result<bool> {
        let mut claims = self.claims.lock().unwrap();
        let before = claims.len();
        claims.retain(|c| c != claim);
        Ok(claims.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryTrashStore {
    real: Mutex<Vec<TrashItem>>,
    dummy: Mutex<Vec<TrashItem>>,
}

impl MemoryTrashStore {
    fn table(&self, source: ItemSource) -> &Mutex<Vec<TrashItem>> {
        match source {
            ItemSource::Real => &self.real,
            ItemSource::Dummy => &self.dummy,
        }
    }
}

#[async_trait]
impl TrashStore for MemoryTrashStore {
    async fn list(&self, source: ItemSource) -> anyhow::Result<Vec<TrashItem>> {
        Ok(self.table(source).lock().unwrap().clone())
    }

    async fn list_by_type(&self, source: ItemSource, litter_type: &str) -> anyhow::Result<Vec<TrashItem>> {
        let items = self.table(source).lock().unwrap();
        Ok(items
            .iter()
            .filter(|i| i.litter_type.eq_ignore_ascii_case(litter_type))
            .cloned()
            .collect())
    }

    async fn insert(&self, source: ItemSource, item: &TrashItem) -> anyhow::Result<()> {
        let mut items = self.table(source).lock().unwrap();
        if items.iter().any(|i| i.id == item.id) {
            anyhow::bail!("duplicate key {}", item.id);
        }
        items.push(item.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryWeatherStore {
    records: Mutex<Vec<WeatherData>>,
}

impl MemoryWeatherStore {
    pub fn all(&self) -> Vec<WeatherData> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherStore for MemoryWeatherStore {
    async fn exists(&self, date: Date, latitude: f32, longitude: f32) -> anyhow::Result<bool> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .any(|r| r.timestamp.date() == date && r.latitude == latitude && r.longitude == longitude))
    }

    async fn save(&self, record: &WeatherData) -> anyhow::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_desc(&self) -> anyhow::Result<Vec<WeatherData>> {
        let mut records = self.all();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}

#[derive(Default)]
pub struct MemoryPredictionStore {
    results: Mutex<Vec<PredictionResult>>,
}

#[async_trait]
impl PredictionStore for MemoryPredictionStore {
    async fn exists_similar(&self, date: Date, weather: &str, temp: f32) -> anyhow::Result<bool> {
        let results = self.results.lock().unwrap();
        Ok(results.iter().any(|r| {
            r.timestamp.date() == date && r.weather == weather && (r.temp - temp).abs() < TEMP_TOLERANCE
        }))
    }

    async fn save(&self, result: &PredictionResult) -> anyhow::Result<()> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<PredictionResult>> {
        let mut results = self.results.lock().unwrap().clone();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(results)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<PredictionResult>> {
        let results = self.results.lock().unwrap();
        Ok(results.iter().find(|r| r.id == id).cloned())
    }
}

fn status_error(status: StatusCode, body: &str) -> UpstreamError {
    UpstreamError::Status {
        status,
        body: body.to_string(),
    }
}

/// Answers with the configured daily block, or fails with a fixed status.
/// Current conditions are always 18 degrees, partly cloudy.
#[derive(Default)]
pub struct FakeWeatherApi {
    daily: Option<Daily>,
    failure: Option<(StatusCode, String)>,
}

impl FakeWeatherApi {
    pub fn with_daily(daily: Daily) -> Self {
        Self {
            daily: Some(daily),
            failure: None,
        }
    }

    pub fn failing(status: StatusCode, body: &str) -> Self {
        Self {
            daily: None,
            failure: Some((status, body.to_string())),
        }
    }
}

#[async_trait]
impl WeatherApi for FakeWeatherApi {
    fn daily_url(&self, q: &DailyQuery) -> String {
        format!(
            "http://open-meteo.test/v1/forecast?start_date={}&end_date={}",
            crate::datetime::format_date(q.start),
            crate::datetime::format_date(q.end)
        )
    }

    fn current_url(&self, latitude: f32, longitude: f32) -> String {
        format!("http://open-meteo.test/v1/forecast?latitude={latitude}&longitude={longitude}")
    }

    async fn daily(&self, _q: &DailyQuery) -> upstream::Result<Option<Daily>> {
        if let Some((status, body)) = &self.failure {
            return Err(status_error(*status, body));
        }
        Ok(self.daily.clone())
    }

    async fn current(&self, _latitude: f32, _longitude: f32) -> upstream::Result<Current> {
        if let Some((status, body)) = &self.failure {
            return Err(status_error(*status, body));
        }
        Ok(Current {
            temperature_2m: 18.0,
            weather_code: Some(2),
        })
    }
}

pub struct FakePredictionApi {
    answer: Result<ModelResponse, (StatusCode, String)>,
    calls: AtomicUsize,
}

impl FakePredictionApi {
    pub fn answering(answer: ModelResponse) -> Self {
        Self {
            answer: Ok(answer),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: StatusCode, body: &str) -> Self {
        Self {
            answer: Err((status, body.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionApi for FakePredictionApi {
    async fn predict(&self, _req: &ModelRequest) -> upstream::Result<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Ok(answer) => Ok(answer.clone()),
            Err((status, body)) => Err(status_error(*status, body)),
        }
    }
}

/// Answers every analysis the same way and remembers the last request.
pub struct FakeCorrelationApi {
    answer: Result<CorrelationData, (StatusCode, String)>,
    last: Mutex<Option<CorrelationRequest>>,
}

impl FakeCorrelationApi {
    pub fn answering(answer: CorrelationData) -> Self {
        Self {
            answer: Ok(answer),
            last: Mutex::new(None),
        }
    }

    pub fn failing(status: StatusCode, body: &str) -> Self {
        Self {
            answer: Err((status, body.to_string())),
            last: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<CorrelationRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CorrelationApi for FakeCorrelationApi {
    async fn analyze(&self, req: &CorrelationRequest) -> upstream::Result<CorrelationData> {
        *self.last.lock().unwrap() = Some(req.clone());
        match &self.answer {
            Ok(answer) => Ok(answer.clone()),
            Err((status, body)) => Err(status_error(*status, body)),
        }
    }
}

/// Knows a fixed set of points; everything else is a 503.
#[derive(Default)]
pub struct FakeGeocoder {
    known: Vec<(String, Address)>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn with(mut self, lat: f32, lon: f32, address: Address) -> Self {
        self.known.push((location_key(lat, lon), address));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn reverse(&self, lat: f32, lon: f32) -> upstream::Result<Option<Address>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = location_key(lat, lon);
        match self.known.iter().find(|(k, _)| *k == key) {
            Some((_, address)) => Ok(Some(address.clone())),
            None => Err(status_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable")),
        }
    }
}
