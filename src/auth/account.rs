//! Claim and user administration under `/account/AccountManagement`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AddClaimRequest, ClaimAdded, ClaimView, CurrentUser, MessageResponse,
            RemoveClaimQuery, UserSummary,
        },
        jwt::AuthUser,
        repo_types::{User, UserClaim},
    },
    state::AppState,
};

const USER_NOT_FOUND: &str = "Gebruiker niet gevonden";

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/account/AccountManagement/:user_id/claims",
            get(list_claims).post(add_claim).delete(remove_claim),
        )
        .route("/account/AccountManagement/users", get(list_users))
        .route("/account/AccountManagement/me", get(current_user))
}

#[instrument(skip(state, _auth, body))]
pub async fn add_claim(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AddClaimRequest>,
) -> Result<Json<ClaimAdded>, (StatusCode, String)> {
    if body.claim_type.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "ClaimType is required".into()));
    }
    let user = load_user(&state, user_id).await?;

    let claim = UserClaim {
        user_id: user.id,
        claim_type: body.claim_type.clone(),
        claim_value: body.claim_value.clone().unwrap_or_default(),
    };
    state.users.add_claim(&claim).await.map_err(|e| {
        error!(error = %e, %user_id, "add_claim failed");
        (StatusCode::BAD_REQUEST, "Could not add claim".to_string())
    })?;

    info!(%user_id, claim_type = %claim.claim_type, "claim added");
    Ok(Json(ClaimAdded {
        message: "Claim succesvol toegevoegd".into(),
        user_id,
        claim_type: body.claim_type,
        claim_value: body.claim_value,
    }))
}

#[instrument(skip(state, _auth))]
pub async fn list_claims(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ClaimView>>, (StatusCode, String)> {
    let user = load_user(&state, user_id).await?;
    let claims = claims_of(&state, &user).await?;
    Ok(Json(claims))
}

#[instrument(skip(state, _auth))]
pub async fn remove_claim(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(q): Query<RemoveClaimQuery>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let user = load_user(&state, user_id).await?;
    let claim = UserClaim {
        user_id: user.id,
        claim_type: q.claim_type,
        claim_value: q.claim_value,
    };
    let removed = state.users.remove_claim(&claim).await.map_err(|e| {
        error!(error = %e, %user_id, "remove_claim failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not remove claim".to_string())
    })?;
    if !removed {
        warn!(%user_id, claim_type = %claim.claim_type, "claim not present");
        return Err((StatusCode::BAD_REQUEST, "Claim niet gevonden".into()));
    }

    info!(%user_id, claim_type = %claim.claim_type, "claim removed");
    Ok(Json(MessageResponse {
        message: "Claim succesvol verwijderd".into(),
    }))
}

#[instrument(skip(state, _auth))]
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<UserSummary>>, (StatusCode, String)> {
    let users = state.users.list().await.map_err(|e| {
        error!(error = %e, "list users failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not load users".to_string())
    })?;
    Ok(Json(
        users
            .into_iter()
            .map(|u| UserSummary {
                id: u.id,
                user_name: u.email.clone(),
                email: u.email,
                email_confirmed: u.email_confirmed,
            })
            .collect(),
    ))
}

#[instrument(skip_all, fields(user_id = %auth.id))]
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CurrentUser>, (StatusCode, String)> {
    let user = load_user(&state, auth.id).await?;
    let claims = claims_of(&state, &user).await?;
    Ok(Json(CurrentUser {
        id: user.id,
        user_name: user.email.clone(),
        email: user.email,
        email_confirmed: user.email_confirmed,
        claims,
    }))
}

async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, (StatusCode, String)> {
    match state.users.find_by_id(user_id).await {
        Ok(Some(u)) => Ok(u),
        Ok(None) => Err((StatusCode::NOT_FOUND, USER_NOT_FOUND.into())),
        Err(e) => {
            error!(error = %e, %user_id, "find_by_id failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Could not load user".into()))
        }
    }
}

async fn claims_of(state: &AppState, user: &User) -> Result<Vec<ClaimView>, (StatusCode, String)> {
    let claims = state.users.claims(user.id).await.map_err(|e| {
        error!(error = %e, user_id = %user.id, "claims lookup failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not load claims".to_string())
    })?;
    Ok(claims
        .into_iter()
        .map(|c| ClaimView {
            claim_type: c.claim_type,
            value: c.claim_value,
        })
        .collect())
}
