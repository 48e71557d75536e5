use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, AuthStatus, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        claims::TokenKind,
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, is_valid_email, policy_violations, verify_password},
        repo::is_unique_violation,
        repo_types::User,
    },
    state::AppState,
};

type AuthResult = Result<Json<AuthResponse>, (StatusCode, Json<AuthResponse>)>;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/Auth/register", post(register))
        .route("/api/Auth/login", post(login))
        .route("/api/Auth/refresh", post(refresh))
        .route("/api/Auth/test", get(status))
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/account/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AuthResult {
    payload.email = payload.email.trim().to_lowercase();
    info!(email = %payload.email, "registration attempt");

    let mut errors = Vec::new();
    if !is_valid_email(&payload.email) {
        errors.push("Invalid email format".to_string());
    }
    if let Some(confirm) = &payload.confirm_password {
        if confirm != &payload.password {
            errors.push("Passwords do not match".to_string());
        }
    }
    errors.extend(policy_violations(&payload.password));
    if !errors.is_empty() {
        warn!(email = %payload.email, ?errors, "registration rejected");
        return Err(fail(StatusCode::BAD_REQUEST, "Registration failed", errors));
    }

    match state.users.find_by_email(&payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err(fail(
                StatusCode::CONFLICT,
                "Registration failed",
                vec!["Email already registered".into()],
            ));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal("Internal server error during registration"));
        }
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        internal("Internal server error during registration")
    })?;

    let user = match state.users.create(&payload.email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email registered concurrently");
            return Err(fail(
                StatusCode::CONFLICT,
                "Registration failed",
                vec!["Email already registered".into()],
            ));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(internal("Internal server error during registration"));
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    issue_tokens(&state, &user, "Registration successful")
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> AuthResult {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "Invalid email",
            vec!["Invalid email format".into()],
        ));
    }

    let user = match state.users.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(fail(StatusCode::UNAUTHORIZED, "Invalid credentials", vec![]));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal("Internal server error during login"));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        internal("Internal server error during login")
    })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(fail(StatusCode::UNAUTHORIZED, "Invalid credentials", vec![]));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    issue_tokens(&state, &user, "Login successful")
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AuthResult {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(&payload.refresh_token, TokenKind::Refresh).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        fail(StatusCode::UNAUTHORIZED, "Invalid refresh token", vec![])
    })?;

    let user = match state.users.find_by_id(claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err(fail(StatusCode::UNAUTHORIZED, "User not found", vec![])),
        Err(e) => {
            error!(error = %e, "find_by_id failed");
            return Err(internal("Internal server error during refresh"));
        }
    };

    issue_tokens(&state, &user, "Token refreshed")
}

pub async fn status() -> Json<AuthStatus> {
    info!("auth status endpoint called");
    Json(AuthStatus {
        message: "Auth API is working".into(),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Tokens are stateless, so logout only confirms the caller was signed in.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(user: AuthUser) -> StatusCode {
    info!(email = %user.email, "user logged out");
    StatusCode::OK
}

fn issue_tokens(state: &AppState, user: &User, message: &str) -> AuthResult {
    let tokens = JwtKeys::from_ref(state).issue(user).map_err(|e| {
        error!(error = %e, user_id = %user.id, "jwt signing failed");
        internal("Could not issue token")
    })?;

    Ok(Json(AuthResponse {
        success: true,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: Some(PublicUser {
            id: user.id,
            email: user.email.clone(),
        }),
        message: message.into(),
        errors: vec![],
    }))
}

fn fail(status: StatusCode, message: &str, errors: Vec<String>) -> (StatusCode, Json<AuthResponse>) {
    (status, Json(AuthResponse::failure(message, errors)))
}

fn internal(message: &str) -> (StatusCode, Json<AuthResponse>) {
    fail(StatusCode::INTERNAL_SERVER_ERROR, message, vec![])
}
