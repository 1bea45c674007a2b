use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::errors::{map_write_error, ApiError};
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{self, PaginatedResponse};
use crate::api::validation::{json_body, non_blank, query_params, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::students::StudentFilters;
use crate::schemas::student::{
    EnrolledSubjectResponse, EnrollmentRequest, EnrollmentResponse, StudentCreate,
    StudentDetailResponse, StudentListQuery, StudentResponse, StudentUpdate,
};
use crate::services::enrollment;

const DUPLICATE_ROLL: &str = "Student with this roll number already exists";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/:student_id", get(get_student).patch(update_student).delete(delete_student))
        .route("/:student_id/subjects", get(list_enrollments).post(enroll_subject))
        .route("/:student_id/subjects/:subject_id", delete(withdraw_subject))
}

async fn list_students(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<StudentListQuery>, QueryRejection>,
) -> Result<Json<PaginatedResponse<StudentResponse>>, ApiError> {
    let query = query_params(query)?;
    let (skip, limit) = pagination::normalize(query.skip, query.limit);
    let filters = StudentFilters {
        class_id: query.class_id,
        session_id: query.session_id,
        study_group: query.study_group,
    };

    let students = repositories::students::list(state.db(), &filters, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;
    let total_count = repositories::students::count(state.db(), &filters)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count students"))?;

    Ok(Json(PaginatedResponse {
        items: students.into_iter().map(StudentResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn create_student(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    payload: Result<Json<StudentCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;
    non_blank("name", &payload.name)?;
    non_blank("roll_number", &payload.roll_number)?;
    ensure_placement(&state, Some(&payload.class_id), Some(&payload.session_id)).await?;

    let now = primitive_now_utc();
    let student = repositories::students::create(
        state.db(),
        repositories::students::CreateStudent {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            roll_number: payload.roll_number.trim(),
            class_id: &payload.class_id,
            session_id: &payload.session_id,
            email: payload.email.as_deref(),
            phone: payload.phone.as_deref(),
            address: payload.address.as_deref(),
            date_of_birth: payload.date_of_birth,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| map_write_error(e, DUPLICATE_ROLL, "Failed to create student"))?;

    tracing::info!(student_id = %student.id, action = "create", "Student created");
    Ok((StatusCode::CREATED, Json(StudentResponse::from_db(student))))
}

async fn get_student(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentDetailResponse>, ApiError> {
    let student = repositories::students::find_by_id(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound(format!("student not found: {student_id}")))?;

    let subjects = repositories::student_subjects::list_for_student(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list student subjects"))?;

    Ok(Json(StudentDetailResponse {
        student: StudentResponse::from_db(student),
        subjects: subjects.into_iter().map(EnrolledSubjectResponse::from_row).collect(),
    }))
}

async fn update_student(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    payload: Result<Json<StudentUpdate>, JsonRejection>,
) -> Result<Json<StudentResponse>, ApiError> {
    let payload = json_body(payload)?;
    validate_payload(&payload)?;
    ensure_placement(&state, payload.class_id.as_deref(), payload.session_id.as_deref()).await?;

    let updated = repositories::students::update(
        state.db(),
        &student_id,
        repositories::students::UpdateStudent {
            name: payload.name.map(|name| name.trim().to_string()),
            roll_number: payload.roll_number.map(|roll| roll.trim().to_string()),
            class_id: payload.class_id,
            session_id: payload.session_id,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            date_of_birth: payload.date_of_birth,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| map_write_error(e, DUPLICATE_ROLL, "Failed to update student"))?
    .ok_or_else(|| ApiError::NotFound(format!("student not found: {student_id}")))?;

    Ok(Json(StudentResponse::from_db(updated)))
}

async fn delete_student(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::students::delete(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete student"))?;

    if !deleted {
        return Err(ApiError::NotFound(format!("student not found: {student_id}")));
    }
    tracing::info!(student_id = %student_id, action = "delete", "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_enrollments(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<EnrolledSubjectResponse>>, ApiError> {
    let exists = repositories::students::exists(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?;
    if !exists {
        return Err(ApiError::NotFound(format!("student not found: {student_id}")));
    }

    let subjects = repositories::student_subjects::list_for_student(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list student subjects"))?;
    Ok(Json(subjects.into_iter().map(EnrolledSubjectResponse::from_row).collect()))
}

async fn enroll_subject(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    payload: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let payload = json_body(payload)?;
    let pairing =
        enrollment::enroll(state.db(), &student_id, &payload.subject_id, payload.study_group)
            .await?;
    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from_db(pairing))))
}

async fn withdraw_subject(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path((student_id, subject_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    enrollment::withdraw(state.db(), &student_id, &subject_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_placement(
    state: &AppState,
    class_id: Option<&str>,
    session_id: Option<&str>,
) -> Result<(), ApiError> {
    if let Some(class_id) = class_id {
        let class = repositories::classes::find_by_id(state.db(), class_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?;
        if class.is_none() {
            return Err(ApiError::NotFound(format!("class not found: {class_id}")));
        }
    }
    if let Some(session_id) = session_id {
        let exists = repositories::academic_sessions::exists(state.db(), session_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch session"))?;
        if !exists {
            return Err(ApiError::NotFound(format!("session not found: {session_id}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
