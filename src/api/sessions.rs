use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::{map_delete_error, map_write_error, ApiError};
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::{non_blank, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::academics::{SessionCreate, SessionResponse, SessionUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/:session_id", get(get_session).patch(update_session).delete(delete_session))
}

async fn list_sessions(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = repositories::academic_sessions::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list sessions"))?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from_db).collect()))
}

async fn create_session(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<SessionCreate>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    validate_payload(&payload)?;
    non_blank("name", &payload.name)?;

    let now = primitive_now_utc();
    let session = repositories::academic_sessions::create(
        state.db(),
        repositories::academic_sessions::CreateSession {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            start_year: payload.start_year,
            end_year: payload.end_year,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        map_write_error(e, "Session with this name already exists", "Failed to create session")
    })?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from_db(session))))
}

async fn get_session(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = repositories::academic_sessions::find_by_id(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch session"))?
        .ok_or_else(|| ApiError::NotFound(format!("session not found: {session_id}")))?;
    Ok(Json(SessionResponse::from_db(session)))
}

async fn update_session(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(payload): Json<SessionUpdate>,
) -> Result<Json<SessionResponse>, ApiError> {
    validate_payload(&payload)?;

    let current = repositories::academic_sessions::find_by_id(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch session"))?
        .ok_or_else(|| ApiError::NotFound(format!("session not found: {session_id}")))?;

    let start_year = payload.start_year.unwrap_or(current.start_year);
    let end_year = payload.end_year.unwrap_or(current.end_year);
    if end_year < start_year {
        return Err(ApiError::validation("end_year", "end_year must not be before start_year"));
    }

    let updated = repositories::academic_sessions::update(
        state.db(),
        &session_id,
        repositories::academic_sessions::UpdateSession {
            name: payload.name.map(|name| name.trim().to_string()),
            start_year: payload.start_year,
            end_year: payload.end_year,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        map_write_error(e, "Session with this name already exists", "Failed to update session")
    })?
    .ok_or_else(|| ApiError::NotFound(format!("session not found: {session_id}")))?;

    Ok(Json(SessionResponse::from_db(updated)))
}

async fn delete_session(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::academic_sessions::delete(state.db(), &session_id)
        .await
        .map_err(|e| {
            map_delete_error(
                e,
                "Session is still referenced by students",
                "Failed to delete session",
            )
        })?;

    if !deleted {
        return Err(ApiError::NotFound(format!("session not found: {session_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
