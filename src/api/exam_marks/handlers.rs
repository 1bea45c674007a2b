use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentGrader, CurrentUser};
use crate::api::pagination::{self, PaginatedResponse};
use crate::api::validation::{json_body, query_params};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::exam_mark::{
    AppliedFilters, BulkMarkRequest, BulkMarkResponse, BulkStatus, ExamMarkDetailResponse,
    ExamMarkPayload, ExamMarkResponse, MarkReportResponse,
};
use crate::services::{bulk_marks, grading, mark_reports};

use super::queries::{ListMarksQuery, MarkFilterQuery};

pub(super) async fn create_mark(
    CurrentGrader(grader): CurrentGrader,
    State(state): State<AppState>,
    payload: Result<Json<ExamMarkPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ExamMarkResponse>), ApiError> {
    let input = json_body(payload)?.into_new_mark()?;
    let mark = grading::record_mark(state.db(), input).await?;
    tracing::debug!(mark_id = %mark.id, user_id = %grader.id, "Mark created via API");

    let response = load_response(&state, &mark.id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub(super) async fn list_marks(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<ListMarksQuery>, QueryRejection>,
) -> Result<Json<PaginatedResponse<ExamMarkResponse>>, ApiError> {
    let query = query_params(query)?;
    let (skip, limit) = pagination::normalize(query.skip, query.limit);
    let filters = query.filters.to_filters();

    let rows = repositories::exam_marks::list_rows(state.db(), &filters, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam marks"))?;
    let total_count = repositories::exam_marks::count(state.db(), &filters)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count exam marks"))?;

    Ok(Json(PaginatedResponse {
        items: rows.into_iter().map(ExamMarkResponse::from_row).collect(),
        total_count,
        skip,
        limit,
    }))
}

pub(super) async fn get_mark(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(mark_id): Path<String>,
) -> Result<Json<ExamMarkDetailResponse>, ApiError> {
    let row = repositories::exam_marks::find_row(state.db(), &mark_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam mark"))?
        .ok_or_else(|| ApiError::NotFound(format!("exam mark not found: {mark_id}")))?;

    let student = repositories::students::find_by_id(state.db(), &row.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound(format!("student not found: {}", row.student_id)))?;
    let subject = repositories::subjects::find_by_id(state.db(), &row.subject_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?
        .ok_or_else(|| ApiError::NotFound(format!("subject not found: {}", row.subject_id)))?;

    Ok(Json(ExamMarkDetailResponse::new(row, student, subject)))
}

pub(super) async fn update_mark(
    CurrentGrader(_grader): CurrentGrader,
    State(state): State<AppState>,
    Path(mark_id): Path<String>,
    payload: Result<Json<ExamMarkPayload>, JsonRejection>,
) -> Result<Json<ExamMarkResponse>, ApiError> {
    let changes = json_body(payload)?.into_changes()?;
    let mark = grading::update_mark(state.db(), &mark_id, changes).await?;

    Ok(Json(load_response(&state, &mark.id).await?))
}

pub(super) async fn delete_mark(
    CurrentGrader(_grader): CurrentGrader,
    State(state): State<AppState>,
    Path(mark_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    grading::delete_mark(state.db(), &mark_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn mark_report(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<MarkFilterQuery>, QueryRejection>,
) -> Result<Json<MarkReportResponse>, ApiError> {
    let filters = query_params(query)?.to_filters();

    let rows = repositories::exam_marks::list_all_rows(state.db(), &filters)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam marks for report"))?;

    let statistics = mark_reports::summarize(rows.iter().map(mark_reports::MarkSample::from));

    Ok(Json(MarkReportResponse {
        filters: AppliedFilters::from_filters(&filters),
        statistics,
        records: rows.into_iter().map(ExamMarkResponse::from_row).collect(),
    }))
}

pub(super) async fn bulk_upsert(
    CurrentGrader(grader): CurrentGrader,
    State(state): State<AppState>,
    payload: Result<Json<BulkMarkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkMarkResponse>), ApiError> {
    let request = json_body(payload)?;

    if request.marks.is_empty() {
        return Err(ApiError::validation("marks", "No marks provided"));
    }
    let max_items = state.settings().marks().bulk_max_items;
    if request.marks.len() > max_items {
        return Err(ApiError::validation(
            "marks",
            format!("At most {max_items} marks can be submitted at once"),
        ));
    }

    tracing::info!(user_id = %grader.id, items = request.marks.len(), "Bulk mark upsert requested");
    let response = bulk_marks::bulk_upsert(state.db(), request.marks).await;

    let status = match response.status {
        BulkStatus::Success => StatusCode::OK,
        BulkStatus::Partial => StatusCode::MULTI_STATUS,
    };
    Ok((status, Json(response)))
}

async fn load_response(state: &AppState, mark_id: &str) -> Result<ExamMarkResponse, ApiError> {
    repositories::exam_marks::find_row(state.db(), mark_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam mark"))?
        .map(ExamMarkResponse::from_row)
        .ok_or_else(|| ApiError::NotFound(format!("exam mark not found: {mark_id}")))
}
