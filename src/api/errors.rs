use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::enrollment::EnrollmentError;
use crate::services::grading::GradingError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    code: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    Validation { field: Option<String>, detail: String },
    AttendanceInconsistent(String),
    NotFound(String),
    Duplicate(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    pub(crate) fn validation(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Validation { field: Some(field.into()), detail: detail.into() }
    }

    pub(crate) fn from_validator(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|key| key.to_string());
        Self::Validation { field, detail: errors.to_string() }
    }

    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::AttendanceInconsistent(_) => {
                (StatusCode::BAD_REQUEST, "attendance_inconsistent")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "record_not_found"),
            ApiError::Duplicate(_) => (StatusCode::CONFLICT, "duplicate_record"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let unauthorized = matches!(self, ApiError::Unauthorized(_));

        let (detail, field) = match self {
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => {
                (message.to_string(), None)
            }
            ApiError::Validation { field, detail } => (detail, field),
            ApiError::AttendanceInconsistent(message) => (message, Some("attendance".to_string())),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                (message, None)
            }
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Duplicate(message)
            | ApiError::Conflict(message) => (message, None),
        };

        let mut response =
            (status, Json(ErrorResponse { status: status.as_u16(), code, detail, field }))
                .into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<GradingError> for ApiError {
    fn from(error: GradingError) -> Self {
        match error {
            GradingError::Validation { field, message } => {
                ApiError::Validation { field: Some(field.to_string()), detail: message }
            }
            GradingError::AttendanceInconsistent { .. } => {
                ApiError::AttendanceInconsistent(error.to_string())
            }
            GradingError::DuplicateRecord => ApiError::Duplicate(error.to_string()),
            GradingError::RecordNotFound { .. } => ApiError::NotFound(error.to_string()),
            GradingError::Database(err) => ApiError::internal(err, "Failed to write exam mark"),
        }
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(error: EnrollmentError) -> Self {
        match error {
            EnrollmentError::StudentNotFound(_)
            | EnrollmentError::SubjectNotFound(_)
            | EnrollmentError::NotEnrolled { .. } => ApiError::NotFound(error.to_string()),
            EnrollmentError::Database(err) => {
                ApiError::internal(err, "Failed to update enrollment")
            }
        }
    }
}

/// Maps store-level constraint failures of plain CRUD writes.
pub(crate) fn map_write_error(error: sqlx::Error, duplicate: &str, context: &str) -> ApiError {
    if crate::db::is_unique_violation(&error) {
        ApiError::Duplicate(duplicate.to_string())
    } else if crate::db::is_foreign_key_violation(&error) {
        let detail = "Referenced record is missing or still in use";
        ApiError::Conflict(match crate::db::violated_constraint(&error) {
            Some(constraint) => format!("{detail} ({constraint})"),
            None => detail.to_string(),
        })
    } else {
        ApiError::internal(error, context)
    }
}

/// Deletes fail with a foreign-key violation while other rows still reference the target.
pub(crate) fn map_delete_error(error: sqlx::Error, in_use: &str, context: &str) -> ApiError {
    if crate::db::is_foreign_key_violation(&error) {
        ApiError::Conflict(in_use.to_string())
    } else {
        ApiError::internal(error, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value, Option<HeaderValue>) {
        let response = error.into_response();
        let status = response.status();
        let auth = response.headers().get(header::WWW_AUTHENTICATE).cloned();
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&body).expect("json"), auth)
    }

    #[tokio::test]
    async fn grading_errors_map_to_codes() {
        let (status, body, _) = body_of(
            GradingError::AttendanceInconsistent { total_class: 10, present: 8, absent: 3 }.into(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "attendance_inconsistent");
        assert_eq!(body["field"], "attendance");

        let (status, body, _) = body_of(GradingError::DuplicateRecord.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "duplicate_record");

        let (status, body, _) = body_of(
            GradingError::RecordNotFound { entity: "exam mark", id: "missing".to_string() }
                .into(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "record_not_found");
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn unauthorized_sets_bearer_challenge() {
        let (status, body, auth) =
            body_of(ApiError::Unauthorized("Invalid authentication credentials")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(auth, Some(HeaderValue::from_static("Bearer")));
    }
}
