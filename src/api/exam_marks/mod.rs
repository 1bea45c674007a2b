mod handlers;
mod queries;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_mark).get(handlers::list_marks))
        .route("/report", get(handlers::mark_report))
        .route("/bulk", post(handlers::bulk_upsert))
        .route(
            "/:mark_id",
            get(handlers::get_mark).patch(handlers::update_mark).delete(handlers::delete_mark),
        )
}

#[cfg(test)]
mod tests;
