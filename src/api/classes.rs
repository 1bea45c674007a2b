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
use crate::schemas::academics::{ClassCreate, ClassResponse, ClassUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route("/:class_id", get(get_class).patch(update_class).delete(delete_class))
}

async fn list_classes(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let classes = repositories::classes::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list classes"))?;
    Ok(Json(classes.into_iter().map(ClassResponse::from_db).collect()))
}

async fn create_class(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ClassCreate>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    validate_payload(&payload)?;
    non_blank("name", &payload.name)?;
    non_blank("code", &payload.code)?;

    let now = primitive_now_utc();
    let class = repositories::classes::create(
        state.db(),
        repositories::classes::CreateClass {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            code: payload.code.trim(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        map_write_error(e, "Class with this code already exists", "Failed to create class")
    })?;

    Ok((StatusCode::CREATED, Json(ClassResponse::from_db(class))))
}

async fn get_class(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<ClassResponse>, ApiError> {
    let class = repositories::classes::find_by_id(state.db(), &class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?
        .ok_or_else(|| ApiError::NotFound(format!("class not found: {class_id}")))?;
    Ok(Json(ClassResponse::from_db(class)))
}

async fn update_class(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(payload): Json<ClassUpdate>,
) -> Result<Json<ClassResponse>, ApiError> {
    validate_payload(&payload)?;

    let updated = repositories::classes::update(
        state.db(),
        &class_id,
        repositories::classes::UpdateClass {
            name: payload.name.map(|name| name.trim().to_string()),
            code: payload.code.map(|code| code.trim().to_string()),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        map_write_error(e, "Class with this code already exists", "Failed to update class")
    })?
    .ok_or_else(|| ApiError::NotFound(format!("class not found: {class_id}")))?;

    Ok(Json(ClassResponse::from_db(updated)))
}

async fn delete_class(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::classes::delete(state.db(), &class_id)
        .await
        .map_err(|e| {
            map_delete_error(e, "Class is still referenced by students", "Failed to delete class")
        })?;

    if !deleted {
        return Err(ApiError::NotFound(format!("class not found: {class_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
