use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn reversed_years_are_rejected() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/sessions",
            Some(&token),
            Some(json!({ "name": "2025-2024", "start_year": 2025, "end_year": 2024 })),
        ))
        .await
        .expect("create session");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn any_signed_in_user_can_list_sessions() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let pupil =
        test_support::insert_user(db, "student01", "Student", "pass", UserRole::Student).await;
    let token = test_support::bearer_token(&pupil.id, ctx.state.settings());
    test_support::insert_session(db, "2023-2024", 2023).await;
    test_support::insert_session(db, "2024-2025", 2024).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/sessions", Some(&token), None))
        .await
        .expect("list sessions");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().expect("sessions").len(), 2);
}
