use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories::dashboard;
use crate::schemas::dashboard::{CountEntry, DashboardResponse};
use crate::services::mark_reports::GradeDistribution;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(summary))
}

async fn summary(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let db = state.db();
    let totals =
        dashboard::totals(db).await.map_err(|e| ApiError::internal(e, "Failed to count records"))?;
    let students_per_class = dashboard::students_per_class(db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count students per class"))?;
    let students_per_session = dashboard::students_per_session(db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count students per session"))?;
    let teachers_per_department = dashboard::teachers_per_department(db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count teachers per department"))?;
    let marks_per_exam_type = dashboard::marks_per_exam_type(db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count marks per exam type"))?;
    let grade_counts = dashboard::grade_counts(db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count grades"))?;

    let distribution = GradeDistribution::from_counts(grade_counts);

    Ok(Json(DashboardResponse {
        totals: totals.into(),
        students_per_class: CountEntry::from_rows(students_per_class),
        students_per_session: CountEntry::from_rows(students_per_session),
        teachers_per_department: CountEntry::from_rows(teachers_per_department),
        marks_per_exam_type: CountEntry::from_rows(marks_per_exam_type),
        grade_distribution: distribution.buckets(),
        pass_rate: distribution.pass_rate(),
    }))
}
