use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn admin_creates_teacher_linked_to_account() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let account =
        test_support::insert_user(db, "teacher01", "Farhana Akter", "pass", UserRole::Teacher)
            .await;
    let subject = test_support::insert_subject(db, "Physics", "PHY-101", None).await;

    let payload = json!({
        "name": "Farhana Akter",
        "user_id": account.id,
        "subject_id": subject.id,
        "post": "associate_professor",
        "department": "Physics"
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/teachers",
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .expect("create teacher");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = test_support::read_json(response).await;
    assert_eq!(body["post"], "associate_professor");
    assert_eq!(body["user_id"], account.id.as_str());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/teachers",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("create second teacher");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/teachers?department=Physics",
            Some(&token),
            None,
        ))
        .await
        .expect("list teachers");
    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().expect("teachers").len(), 1);
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_admin(ctx.state.db(), "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/teachers",
            Some(&token),
            Some(json!({ "name": "Ghost", "user_id": "missing-user" })),
        ))
        .await
        .expect("create teacher");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
