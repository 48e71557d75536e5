use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use time::Date;

use super::dto::WeatherData;

#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// True when a record for the same UTC calendar day and coordinates exists.
    async fn exists(&self, date: Date, latitude: f32, longitude: f32) -> anyhow::Result<bool>;
    async fn save(&self, record: &WeatherData) -> anyhow::Result<()>;
    /// All records, newest first.
    async fn list_desc(&self) -> anyhow::Result<Vec<WeatherData>>;
}

#[derive(Clone)]
pub struct PgWeatherStore {
    db: PgPool,
}

impl PgWeatherStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WeatherStore for PgWeatherStore {
    async fn exists(&self, date: Date, latitude: f32, longitude: f32) -> anyhow::Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM weather_data
                 WHERE ("timestamp" AT TIME ZONE 'UTC')::date = $1
                   AND latitude = $2
                   AND longitude = $3
            )
            "#,
        )
        .bind(date)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(&self.db)
        .await
        .context("check weather record")?;
        Ok(found)
    }

    async fn save(&self, record: &WeatherData) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO weather_data (id, "timestamp", latitude, longitude, temperature, weather_description)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.timestamp)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.temperature)
        .bind(&record.weather_description)
        .execute(&self.db)
        .await
        .context("insert weather record")?;
        Ok(())
    }

    async fn list_desc(&self) -> anyhow::Result<Vec<WeatherData>> {
        let rows = sqlx::query_as::<_, WeatherData>(
            r#"
            SELECT id, "timestamp", latitude, longitude, temperature, weather_description
              FROM weather_data
             ORDER BY "timestamp" DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list weather records")?;
        Ok(rows)
    }
}
