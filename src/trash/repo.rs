use axum::async_trait;
use sqlx::PgPool;

use super::dto::{ItemSource, TrashItem};

#[async_trait]
pub trait TrashStore: Send + Sync {
    async fn list(&self, source: ItemSource) -> anyhow::Result<Vec<TrashItem>>;
    /// Case-insensitive match on `litter_type`.
    async fn list_by_type(&self, source: ItemSource, litter_type: &str) -> anyhow::Result<Vec<TrashItem>>;
    async fn insert(&self, source: ItemSource, item: &TrashItem) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgTrashStore {
    db: PgPool,
}

impl PgTrashStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrashStore for PgTrashStore {
    async fn list(&self, source: ItemSource) -> anyhow::Result<Vec<TrashItem>> {
        let sql = format!(
            r#"SELECT id, litter_type, latitude, longitude, "timestamp" FROM {}"#,
            source.table()
        );
        let rows = sqlx::query_as::<_, TrashItem>(&sql).fetch_all(&self.db).await?;
        Ok(rows)
    }

    async fn list_by_type(&self, source: ItemSource, litter_type: &str) -> anyhow::Result<Vec<TrashItem>> {
        let sql = format!(
            r#"
            SELECT id, litter_type, latitude, longitude, "timestamp"
            FROM {}
            WHERE lower(litter_type) = lower($1)
            "#,
            source.table()
        );
        let rows = sqlx::query_as::<_, TrashItem>(&sql)
            .bind(litter_type)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, source: ItemSource, item: &TrashItem) -> anyhow::Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, litter_type, latitude, longitude, "timestamp")
            VALUES ($1, $2, $3, $4, $5)
            "#,
            source.table()
        );
        sqlx::query(&sql)
            .bind(item.id)
            .bind(&item.litter_type)
            .bind(item.latitude)
            .bind(item.longitude)
            .bind(item.timestamp)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
