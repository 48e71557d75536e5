use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct WeatherData {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub latitude: f32,
    pub longitude: f32,
    pub temperature: f32,
    pub weather_description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeatherRequest {
    #[serde(alias = "latitude")]
    pub latitude: f32,
    #[serde(alias = "longitude")]
    pub longitude: f32,
    #[serde(alias = "startDate", deserialize_with = "crate::datetime::lenient::deserialize")]
    pub start_date: OffsetDateTime,
    #[serde(alias = "endDate", deserialize_with = "crate::datetime::lenient::deserialize")]
    pub end_date: OffsetDateTime,
}

/// Body returned when Open-Meteo answers with an error status.
#[derive(Debug, Serialize)]
pub struct UpstreamFailure {
    pub message: &'static str,
    pub status: u16,
    pub error: String,
    pub url: String,
}
