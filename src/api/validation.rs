use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use validator::Validate;

use crate::api::errors::ApiError;

pub(crate) fn validate_payload(payload: &impl Validate) -> Result<(), ApiError> {
    payload.validate().map_err(ApiError::from_validator)
}

/// Unwraps a JSON body, reporting malformed input as a validation error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| ApiError::Validation {
        field: None,
        detail: rejection.body_text(),
    })
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|Query(value)| value).map_err(|rejection| ApiError::Validation {
        field: None,
        detail: rejection.body_text(),
    })
}

pub(crate) fn non_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::validation(field, format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
