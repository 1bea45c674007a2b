use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::{map_delete_error, map_write_error, ApiError};
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::{json_body, non_blank, query_params, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::exam_marks::MarkFilters;
use crate::schemas::exam_mark::ExamMarkResponse;
use crate::schemas::exam_type::{
    ExamTypeCreate, ExamTypeListQuery, ExamTypeMarksResponse, ExamTypeResponse, ExamTypeUpdate,
};

const DUPLICATE_NAME: &str = "Exam type with this name already exists";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exam_types).post(create_exam_type))
        .route(
            "/:exam_type_id",
            get(get_exam_type).patch(update_exam_type).delete(delete_exam_type),
        )
        .route("/:exam_type_id/marks", get(marks_by_exam_type))
}

async fn list_exam_types(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<ExamTypeListQuery>, QueryRejection>,
) -> Result<Json<Vec<ExamTypeResponse>>, ApiError> {
    let query = query_params(query)?;
    let exam_types = repositories::exam_types::list(state.db(), query.active_only)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam types"))?;
    Ok(Json(exam_types.into_iter().map(ExamTypeResponse::from_db).collect()))
}

async fn create_exam_type(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    payload: Result<Json<ExamTypeCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<ExamTypeResponse>), ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;
    non_blank("name", &payload.name)?;

    let now = primitive_now_utc();
    let exam_type = repositories::exam_types::create(
        state.db(),
        repositories::exam_types::CreateExamType {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            description: payload.description.trim(),
            is_active: payload.is_active,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| map_write_error(e, DUPLICATE_NAME, "Failed to create exam type"))?;

    Ok((StatusCode::CREATED, Json(ExamTypeResponse::from_db(exam_type))))
}

async fn get_exam_type(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_type_id): Path<String>,
) -> Result<Json<ExamTypeResponse>, ApiError> {
    let exam_type = repositories::exam_types::find_by_id(state.db(), &exam_type_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam type"))?
        .ok_or_else(|| ApiError::NotFound(format!("exam type not found: {exam_type_id}")))?;
    Ok(Json(ExamTypeResponse::from_db(exam_type)))
}

async fn update_exam_type(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(exam_type_id): Path<String>,
    payload: Result<Json<ExamTypeUpdate>, JsonRejection>,
) -> Result<Json<ExamTypeResponse>, ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;

    let updated = repositories::exam_types::update(
        state.db(),
        &exam_type_id,
        repositories::exam_types::UpdateExamType {
            name: payload.name.map(|name| name.trim().to_string()),
            description: payload.description,
            is_active: payload.is_active,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| map_write_error(e, DUPLICATE_NAME, "Failed to update exam type"))?
    .ok_or_else(|| ApiError::NotFound(format!("exam type not found: {exam_type_id}")))?;

    Ok(Json(ExamTypeResponse::from_db(updated)))
}

async fn delete_exam_type(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(exam_type_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::exam_types::delete(state.db(), &exam_type_id)
        .await
        .map_err(|e| {
            map_delete_error(
                e,
                "Exam type is still referenced by exam marks",
                "Failed to delete exam type",
            )
        })?;

    if !deleted {
        return Err(ApiError::NotFound(format!("exam type not found: {exam_type_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn marks_by_exam_type(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_type_id): Path<String>,
) -> Result<Json<ExamTypeMarksResponse>, ApiError> {
    let exam_type = repositories::exam_types::find_by_id(state.db(), &exam_type_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam type"))?
        .ok_or_else(|| ApiError::NotFound(format!("exam type not found: {exam_type_id}")))?;

    let filters =
        MarkFilters { exam_type_id: Some(exam_type.id.clone()), ..MarkFilters::default() };
    let rows = repositories::exam_marks::list_all_rows(state.db(), &filters)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam marks"))?;

    Ok(Json(ExamTypeMarksResponse {
        exam_type: ExamTypeResponse::from_db(exam_type),
        count: rows.len(),
        marks: rows.into_iter().map(ExamMarkResponse::from_row).collect(),
    }))
}
