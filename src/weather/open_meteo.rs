use axum::async_trait;
use serde::Deserialize;
use time::Date;

use crate::{datetime::format_date, upstream};

/// Query for daily aggregates over an inclusive date range.
#[derive(Debug, Clone, Copy)]
pub struct DailyQuery {
    pub latitude: f32,
    pub longitude: f32,
    pub start: Date,
    pub end: Date,
}

/// The `daily` block of an Open-Meteo forecast response. The arrays run in
/// parallel; temperatures are null for days the model has no data for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Daily {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f32>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f32>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    pub temperature_2m: f32,
    #[serde(default)]
    pub weather_code: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<Daily>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: Current,
}

#[async_trait]
pub trait WeatherApi: Send + Sync {
    fn daily_url(&self, q: &DailyQuery) -> String;
    fn current_url(&self, latitude: f32, longitude: f32) -> String;
    /// `Ok(None)` when the response carries no `daily` block.
    async fn daily(&self, q: &DailyQuery) -> upstream::Result<Option<Daily>>;
    async fn current(&self, latitude: f32, longitude: f32) -> upstream::Result<Current>;
}

#[derive(Clone)]
pub struct OpenMeteo {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteo {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl WeatherApi for OpenMeteo {
    fn daily_url(&self, q: &DailyQuery) -> String {
        format!(
            "{}/v1/forecast?latitude={}&longitude={}&start_date={}&end_date={}\
             &daily=temperature_2m_max,temperature_2m_min,weather_code&timezone=auto",
            self.base_url,
            q.latitude,
            q.longitude,
            format_date(q.start),
            format_date(q.end),
        )
    }

    fn current_url(&self, latitude: f32, longitude: f32) -> String {
        format!(
            "{}/v1/forecast?latitude={}&longitude={}&current=temperature_2m,weather_code",
            self.base_url, latitude, longitude
        )
    }

    async fn daily(&self, q: &DailyQuery) -> upstream::Result<Option<Daily>> {
        let resp = self.http.get(self.daily_url(q)).send().await?;
        let body = upstream::read_body(resp).await?;
        let parsed: ForecastResponse = serde_json::from_str(&body)?;
        Ok(parsed.daily)
    }

    async fn current(&self, latitude: f32, longitude: f32) -> upstream::Result<Current> {
        let resp = self.http.get(self.current_url(latitude, longitude)).send().await?;
        let body = upstream::read_body(resp).await?;
        let parsed: CurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.current)
    }
}
