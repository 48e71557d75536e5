use std::collections::HashMap;

use anyhow::Context;
use axum::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::dto::{CategoryPrediction, PredictionResult};

/// Temperatures closer than this count as the same forecast.
pub const TEMP_TOLERANCE: f32 = 0.01;

#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// True when a result exists for the same UTC day and weather with a
    /// temperature within `TEMP_TOLERANCE`.
    async fn exists_similar(&self, date: Date, weather: &str, temp: f32) -> anyhow::Result<bool>;
    /// Stores the result together with its category predictions.
    async fn save(&self, result: &PredictionResult) -> anyhow::Result<()>;
    /// All results newest first, categories included.
    async fn list(&self) -> anyhow::Result<Vec<PredictionResult>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<PredictionResult>>;
}

#[derive(Clone)]
pub struct PgPredictionStore {
    db: PgPool,
}

impl PgPredictionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn categories_for(&self, ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, Vec<CategoryPrediction>>> {
        let rows = sqlx::query_as::<_, CategoryPrediction>(
            r#"
            SELECT id, prediction_result_id, category, predicted_value, confidence_score, model_used
              FROM category_predictions
             WHERE prediction_result_id = ANY($1)
             ORDER BY category ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("list category predictions")?;

        let mut grouped: HashMap<Uuid, Vec<CategoryPrediction>> = HashMap::new();
        for row in rows {
            grouped.entry(row.prediction_result_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

async fn insert_category_tx(
    tx: &mut Transaction<'_, Postgres>,
    category: &CategoryPrediction,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO category_predictions
            (id, prediction_result_id, category, predicted_value, confidence_score, model_used)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(category.id)
    .bind(category.prediction_result_id)
    .bind(&category.category)
    .bind(category.predicted_value)
    .bind(category.confidence_score)
    .bind(&category.model_used)
    .execute(&mut **tx)
    .await
    .context("insert category prediction")?;
    Ok(())
}

#[async_trait]
impl PredictionStore for PgPredictionStore {
    async fn exists_similar(&self, date: Date, weather: &str, temp: f32) -> anyhow::Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM prediction_results
                 WHERE ("timestamp" AT TIME ZONE 'UTC')::date = $1
                   AND weather = $2
                   AND abs(temp - $3) < $4
            )
            "#,
        )
        .bind(date)
        .bind(weather)
        .bind(temp)
        .bind(TEMP_TOLERANCE)
        .fetch_one(&self.db)
        .await
        .context("check prediction")?;
        Ok(found)
    }

    async fn save(&self, result: &PredictionResult) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO prediction_results
                (id, "timestamp", latitude, longitude, weather, temp, avg_confidence)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(result.id)
        .bind(result.timestamp)
        .bind(result.latitude)
        .bind(result.longitude)
        .bind(&result.weather)
        .bind(result.temp)
        .bind(result.avg_confidence)
        .execute(&mut *tx)
        .await
        .context("insert prediction result")?;

        for category in &result.predictions {
            insert_category_tx(&mut tx, category).await?;
        }

        tx.commit().await.context("commit prediction")?;
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<PredictionResult>> {
        let mut results = sqlx::query_as::<_, PredictionResult>(
            r#"
            SELECT id, "timestamp", latitude, longitude, weather, temp, avg_confidence
              FROM prediction_results
             ORDER BY "timestamp" DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list predictions")?;

        let ids: Vec<Uuid> = results.iter().map(|r| r.id).collect();
        let mut grouped = self.categories_for(&ids).await?;
        for result in &mut results {
            result.predictions = grouped.remove(&result.id).unwrap_or_default();
        }
        Ok(results)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<PredictionResult>> {
        let row = sqlx::query_as::<_, PredictionResult>(
            r#"
            SELECT id, "timestamp", latitude, longitude, weather, temp, avg_confidence
              FROM prediction_results
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get prediction")?;

        let Some(mut result) = row else {
            return Ok(None);
        };
        result.predictions = self
            .categories_for(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(result))
    }
}
