use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::{map_write_error, ApiError};
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::{json_body, non_blank, query_params, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::teacher::{TeacherCreate, TeacherListQuery, TeacherResponse, TeacherUpdate};

const DUPLICATE_ACCOUNT: &str = "User account is already linked to another teacher";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teachers).post(create_teacher))
        .route("/:teacher_id", get(get_teacher).patch(update_teacher).delete(delete_teacher))
}

async fn list_teachers(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<TeacherListQuery>, QueryRejection>,
) -> Result<Json<Vec<TeacherResponse>>, ApiError> {
    let query = query_params(query)?;
    let department = query.department.as_deref().map(str::trim).filter(|value| !value.is_empty());
    let teachers = repositories::teachers::list(state.db(), department)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list teachers"))?;
    Ok(Json(teachers.into_iter().map(TeacherResponse::from_db).collect()))
}

async fn create_teacher(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    payload: Result<Json<TeacherCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<TeacherResponse>), ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;
    non_blank("name", &payload.name)?;
    ensure_links(&state, payload.user_id.as_deref(), payload.subject_id.as_deref()).await?;

    let now = primitive_now_utc();
    let teacher = repositories::teachers::create(
        state.db(),
        repositories::teachers::CreateTeacher {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            user_id: payload.user_id.as_deref(),
            subject_id: payload.subject_id.as_deref(),
            phone: payload.phone.as_deref(),
            email: payload.email.as_deref(),
            post: payload.post,
            qualification: payload.qualification.as_deref(),
            department: payload.department.as_deref(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| map_write_error(e, DUPLICATE_ACCOUNT, "Failed to create teacher"))?;

    Ok((StatusCode::CREATED, Json(TeacherResponse::from_db(teacher))))
}

async fn get_teacher(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<Json<TeacherResponse>, ApiError> {
    let teacher = repositories::teachers::find_by_id(state.db(), &teacher_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch teacher"))?
        .ok_or_else(|| ApiError::NotFound(format!("teacher not found: {teacher_id}")))?;
    Ok(Json(TeacherResponse::from_db(teacher)))
}

async fn update_teacher(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
    payload: Result<Json<TeacherUpdate>, JsonRejection>,
) -> Result<Json<TeacherResponse>, ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;
    ensure_links(&state, payload.user_id.as_deref(), payload.subject_id.as_deref()).await?;

    let updated = repositories::teachers::update(
        state.db(),
        &teacher_id,
        repositories::teachers::UpdateTeacher {
            name: payload.name.map(|name| name.trim().to_string()),
            user_id: payload.user_id,
            subject_id: payload.subject_id,
            phone: payload.phone,
            email: payload.email,
            post: payload.post,
            qualification: payload.qualification,
            department: payload.department,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| map_write_error(e, DUPLICATE_ACCOUNT, "Failed to update teacher"))?
    .ok_or_else(|| ApiError::NotFound(format!("teacher not found: {teacher_id}")))?;

    Ok(Json(TeacherResponse::from_db(updated)))
}

async fn delete_teacher(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::teachers::delete(state.db(), &teacher_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete teacher"))?;

    if !deleted {
        return Err(ApiError::NotFound(format!("teacher not found: {teacher_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_links(
    state: &AppState,
    user_id: Option<&str>,
    subject_id: Option<&str>,
) -> Result<(), ApiError> {
    if let Some(user_id) = user_id {
        let user = repositories::users::find_by_id(state.db(), user_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;
        if user.is_none() {
            return Err(ApiError::NotFound(format!("user not found: {user_id}")));
        }
    }
    if let Some(subject_id) = subject_id {
        let exists = repositories::subjects::exists(state.db(), subject_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?;
        if !exists {
            return Err(ApiError::NotFound(format!("subject not found: {subject_id}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
