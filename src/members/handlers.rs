use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::StaffUser,
    error::ApiError,
    members::types::{Member, MemberDraft, MemberPage, MemberQuery, QrCode, RegisteredMember},
    state::AppState,
};

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(register_member))
        .route(
            "/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/members/:id/qr", post(regenerate_qr))
}

#[instrument(skip(state, _staff, query))]
pub async fn list_members(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(query): Query<MemberQuery>,
) -> Result<Json<MemberPage>, ApiError> {
    let page = state
        .members
        .list(&query)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(page))
}

#[instrument(skip(state, staff, payload))]
pub async fn register_member(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(mut payload): Json<MemberDraft>,
) -> Result<(StatusCode, Json<RegisteredMember>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let member = state
        .members
        .create(payload)
        .await
        .map_err(ApiError::Internal)?;

    info!(member_id = %member.id, staff = %staff.sub, "member registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisteredMember {
            member_id: member.id,
            qr_code: member.qr_code,
        }),
    ))
}

#[instrument(skip(state, _staff))]
pub async fn get_member(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Member>, ApiError> {
    let member = state
        .members
        .get(id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::not_found(format!("Member with ID {id} not found")))?;
    Ok(Json(member))
}

#[instrument(skip(state, staff, payload))]
pub async fn update_member(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<MemberDraft>,
) -> Result<Json<Member>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let member = state
        .members
        .update(id, payload)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::not_found(format!("Member with ID {id} not found")))?;

    info!(member_id = %member.id, staff = %staff.sub, "member updated");
    Ok(Json(member))
}

#[instrument(skip(state, staff))]
pub async fn delete_member(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .members
        .delete(id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::not_found(format!("Member with ID {id} not found")));
    }
    info!(member_id = %id, staff = %staff.sub, "member deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, staff))]
pub async fn regenerate_qr(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<QrCode>, ApiError> {
    let qr_code = state
        .members
        .regenerate_qr(id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::not_found(format!("Member with ID {id} not found")))?;

    info!(member_id = %id, staff = %staff.sub, "member qr regenerated");
    Ok(Json(QrCode { qr_code }))
}
