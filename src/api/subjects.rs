use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::{map_delete_error, map_write_error, ApiError};
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::{json_body, non_blank, query_params, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::subjects::SubjectFilters;
use crate::schemas::academics::{
    SubjectCreate, SubjectImportRequest, SubjectImportResponse, SubjectListQuery,
    SubjectResponse, SubjectUpdate,
};
use crate::services::subject_import;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subjects).post(create_subject))
        .route("/bulk-import", post(import_subjects))
        .route("/:subject_id", get(get_subject).patch(update_subject).delete(delete_subject))
}

async fn list_subjects(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<SubjectListQuery>, QueryRejection>,
) -> Result<Json<Vec<SubjectResponse>>, ApiError> {
    let query = query_params(query)?;
    let filters = SubjectFilters {
        class_id: query.class_id.filter(|id| !id.trim().is_empty()),
        subject_group: query.subject_group,
        category: query.category,
    };

    let subjects = repositories::subjects::list(state.db(), &filters)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list subjects"))?;
    Ok(Json(subjects.into_iter().map(SubjectResponse::from_db).collect()))
}

async fn create_subject(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    payload: Result<Json<SubjectCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<SubjectResponse>), ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;
    non_blank("name", &payload.name)?;
    non_blank("code", &payload.code)?;
    ensure_class_exists(&state, payload.class_id.as_deref()).await?;

    let now = primitive_now_utc();
    let subject = repositories::subjects::create(
        state.db(),
        repositories::subjects::CreateSubject {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            code: payload.code.trim(),
            class_id: payload.class_id.as_deref(),
            subject_group: payload.subject_group,
            category: payload.category,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        map_write_error(e, "Subject with this code already exists", "Failed to create subject")
    })?;

    Ok((StatusCode::CREATED, Json(SubjectResponse::from_db(subject))))
}

async fn get_subject(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<Json<SubjectResponse>, ApiError> {
    let subject = repositories::subjects::find_by_id(state.db(), &subject_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?
        .ok_or_else(|| ApiError::NotFound(format!("subject not found: {subject_id}")))?;
    Ok(Json(SubjectResponse::from_db(subject)))
}

async fn update_subject(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
    payload: Result<Json<SubjectUpdate>, JsonRejection>,
) -> Result<Json<SubjectResponse>, ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;
    ensure_class_exists(&state, payload.class_id.as_deref()).await?;

    let updated = repositories::subjects::update(
        state.db(),
        &subject_id,
        repositories::subjects::UpdateSubject {
            name: payload.name.map(|name| name.trim().to_string()),
            code: payload.code.map(|code| code.trim().to_string()),
            class_id: payload.class_id,
            subject_group: payload.subject_group,
            category: payload.category,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        map_write_error(e, "Subject with this code already exists", "Failed to update subject")
    })?
    .ok_or_else(|| ApiError::NotFound(format!("subject not found: {subject_id}")))?;

    Ok(Json(SubjectResponse::from_db(updated)))
}

async fn delete_subject(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::subjects::delete(state.db(), &subject_id)
        .await
        .map_err(|e| map_delete_error(e, "Subject is still in use", "Failed to delete subject"))?;

    if !deleted {
        return Err(ApiError::NotFound(format!("subject not found: {subject_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn import_subjects(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    payload: Result<Json<SubjectImportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubjectImportResponse>), ApiError> {
    let request = json_body(payload)?;
    if request.subjects.is_empty() {
        return Err(ApiError::validation("subjects", "No subjects provided"));
    }
    let max_items = state.settings().marks().bulk_max_items;
    if request.subjects.len() > max_items {
        return Err(ApiError::validation(
            "subjects",
            format!("At most {max_items} subjects can be imported at once"),
        ));
    }

    tracing::info!(user_id = %admin.id, items = request.subjects.len(), "Subject import requested");
    let outcome = subject_import::import_subjects(state.db(), request.subjects).await;

    let status =
        if outcome.errors.is_empty() { StatusCode::CREATED } else { StatusCode::MULTI_STATUS };
    let created = outcome.created.into_iter().map(SubjectResponse::from_db).collect::<Vec<_>>();
    Ok((
        status,
        Json(SubjectImportResponse {
            total_created: created.len(),
            total_errors: outcome.errors.len(),
            created,
            errors: outcome.errors,
        }),
    ))
}

async fn ensure_class_exists(state: &AppState, class_id: Option<&str>) -> Result<(), ApiError> {
    let Some(class_id) = class_id else {
        return Ok(());
    };
    let class = repositories::classes::find_by_id(state.db(), class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?;
    if class.is_none() {
        return Err(ApiError::NotFound(format!("class not found: {class_id}")));
    }
    Ok(())
}
