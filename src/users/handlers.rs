use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{jwt::AdminUser, password::hash_password},
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UpdateUserRequest, UserResponse},
        repo::{is_unique_violation, User, UserPatch},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, admin, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    let user = match User::create(&state.db, &payload.name, &payload.email, &hash, payload.role)
        .await
    {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(ApiError::Internal(e.into())),
    };

    info!(user_id = %user.id, email = %user.email, admin = %admin.sub, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = User::find_all(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::not_found(format!("User with ID {id} not found")))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let password_hash = match &payload.password {
        Some(password) => Some(hash_password(password).map_err(ApiError::Internal)?),
        None => None,
    };
    let patch = UserPatch {
        name: payload.name,
        email: payload.email,
        password_hash,
        role: payload.role,
    };

    let user = User::update(&state.db, id, &patch)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::not_found(format!("User with ID {id} not found")))?;

    info!(user_id = %user.id, admin = %admin.sub, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = User::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::not_found(format!("User with ID {id} not found")));
    }
    info!(user_id = %id, admin = %admin.sub, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
