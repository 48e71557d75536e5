use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterRequest {
    #[serde(alias = "email")]
    pub email: String,
    #[serde(alias = "password")]
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub email: String,
    #[serde(alias = "password")]
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RefreshRequest {
    #[serde(alias = "refreshToken", alias = "refresh_token")]
    pub refresh_token: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

/// Returned by register, login and refresh, on success and on failure.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: Option<PublicUser>,
    pub message: String,
    pub errors: Vec<String>,
}

impl AuthResponse {
    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthStatus {
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddClaimRequest {
    #[serde(alias = "claimType")]
    pub claim_type: String,
    #[serde(default, alias = "claimValue")]
    pub claim_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveClaimQuery {
    pub claim_type: String,
    #[serde(default)]
    pub claim_value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClaimAdded {
    pub message: String,
    pub user_id: Uuid,
    pub claim_type: String,
    pub claim_value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClaimView {
    #[serde(rename = "Type")]
    pub claim_type: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub email_confirmed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub email_confirmed: bool,
    pub claims: Vec<ClaimView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageResponse {
    pub message: String,
}
