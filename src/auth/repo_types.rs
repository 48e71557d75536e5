use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub email_confirmed: bool,
    pub created_at: OffsetDateTime,
}

/// A free-form (type, value) pair attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserClaim {
    pub user_id: Uuid,
    pub claim_type: String,
    pub claim_value: String,
}
