use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, QrAuthResponse, QrLoginRequest, RegisterRequest},
        jwt::JwtKeys,
        service,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/qr", post(qr_check_in))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let user = service::validate(&state.db, &payload.email, &payload.password)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login with invalid credentials");
            ApiError::unauthorized("Invalid credentials")
        })?;

    let keys = JwtKeys::from_ref(&state);
    let response = service::issue_token(&keys, &user).map_err(ApiError::Internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let keys = JwtKeys::from_ref(&state);
    let response = service::register(&state.db, &keys, &payload).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn qr_check_in(
    State(state): State<AppState>,
    Json(payload): Json<QrLoginRequest>,
) -> Result<Json<QrAuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let response = service::check_in_qr(state.members.as_ref(), &keys, &payload.qr_code).await?;
    Ok(Json(response))
}
