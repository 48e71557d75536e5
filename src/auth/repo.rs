use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{User, UserClaim};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<User>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn add_claim(&self, claim: &UserClaim) -> anyhow::Result<()>;
    async fn claims(&self, user_id: Uuid) -> anyhow::Result<Vec<UserClaim>>;
    /// Returns `false` when the user had no such claim.
    async fn remove_claim(&self, claim: &UserClaim) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, email_confirmed, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, email_confirmed, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, email_confirmed, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, email_confirmed, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn add_claim(&self, claim: &UserClaim) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_claims (user_id, claim_type, claim_value)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(claim.user_id)
        .bind(&claim.claim_type)
        .bind(&claim.claim_value)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn claims(&self, user_id: Uuid) -> anyhow::Result<Vec<UserClaim>> {
        let rows = sqlx::query_as::<_, UserClaim>(
            r#"
            SELECT user_id, claim_type, claim_value
            FROM user_claims
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn remove_claim(&self, claim: &UserClaim) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM user_claims
            WHERE user_id = $1 AND claim_type = $2 AND claim_value = $3
            "#,
        )
        .bind(claim.user_id)
        .bind(&claim.claim_type)
        .bind(&claim.claim_value)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}

/// True when the error chain holds a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
