use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{StudyGroup, UserRole};
use crate::test_support;

#[tokio::test]
async fn admin_creates_and_fetches_student_with_subjects() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let class = test_support::insert_class(db, "Class Eleven", "XI").await;
    let session = test_support::insert_session(db, "2024-2025", 2024).await;
    let subject = test_support::insert_subject(db, "Chemistry", "CHE-101", None).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/students",
            Some(&token),
            Some(json!({
                "name": "Nusrat Jahan",
                "roll_number": "R-101",
                "class_id": class.id,
                "session_id": session.id,
                "date_of_birth": "2008-02-29"
            })),
        ))
        .await
        .expect("create student");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = test_support::read_json(response).await;
    let student_id = created["id"].as_str().expect("student id").to_string();
    assert_eq!(created["date_of_birth"], "2008-02-29");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/students/{student_id}/subjects"),
            Some(&token),
            Some(json!({ "subject_id": subject.id, "group": "humanities" })),
        ))
        .await
        .expect("enroll");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/students/{student_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get student");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["roll_number"], "R-101");
    let subjects = body["subjects"].as_array().expect("subjects");
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["subject_code"], "CHE-101");
    assert_eq!(subjects[0]["study_group"], "humanities");
}

#[tokio::test]
async fn duplicate_roll_number_conflicts() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let class = test_support::insert_class(db, "Class Eleven", "XI").await;
    let session = test_support::insert_session(db, "2024-2025", 2024).await;
    test_support::insert_student(db, "First", "R-200", &class, &session).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/students",
            Some(&token),
            Some(json!({
                "name": "Second",
                "roll_number": "R-200",
                "class_id": class.id,
                "session_id": session.id
            })),
        ))
        .await
        .expect("create student");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = test_support::read_json(response).await;
    assert_eq!(body["code"], "duplicate_record");
}

#[tokio::test]
async fn unknown_class_is_not_found() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let session = test_support::insert_session(db, "2024-2025", 2024).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/students",
            Some(&token),
            Some(json!({
                "name": "Lost",
                "roll_number": "R-300",
                "class_id": "missing-class",
                "session_id": session.id
            })),
        ))
        .await
        .expect("create student");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teacher_cannot_create_students() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher =
        test_support::insert_user(db, "teacher01", "Teacher", "teacher-pass", UserRole::Teacher)
            .await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/students",
            Some(&token),
            Some(json!({
                "name": "Nobody",
                "roll_number": "R-400",
                "class_id": "c",
                "session_id": "s"
            })),
        ))
        .await
        .expect("create student");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_filters_by_study_group_and_paginates() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let class = test_support::insert_class(db, "Class Twelve", "XII").await;
    let session = test_support::insert_session(db, "2024-2025", 2024).await;
    let subject = test_support::insert_subject(db, "Accounting", "ACC-101", None).await;

    let science = test_support::insert_student(db, "Ayesha", "R-1", &class, &session).await;
    let business = test_support::insert_student(db, "Babul", "R-2", &class, &session).await;
    test_support::insert_student(db, "Chitra", "R-3", &class, &session).await;
    test_support::enroll(db, &science, &subject, StudyGroup::Science).await;
    test_support::enroll(db, &business, &subject, StudyGroup::Business).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/students?group=business",
            Some(&token),
            None,
        ))
        .await
        .expect("list students");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["items"][0]["name"], "Babul");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/students?class_id={}&skip=1&limit=1", class.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list students page");
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["skip"], 1);
    assert_eq!(body["items"].as_array().expect("items").len(), 1);
}

#[tokio::test]
async fn withdrawing_unknown_enrollment_is_not_found() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "admin01").await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let class = test_support::insert_class(db, "Class Eleven", "XI").await;
    let session = test_support::insert_session(db, "2024-2025", 2024).await;
    let student = test_support::insert_student(db, "Ayesha", "R-1", &class, &session).await;
    let subject = test_support::insert_subject(db, "Biology", "BIO-101", None).await;

    let uri = format!("/api/v1/students/{}/subjects/{}", student.id, subject.id);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::DELETE, &uri, Some(&token), None))
        .await
        .expect("withdraw");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_support::enroll(db, &student, &subject, StudyGroup::Science).await;
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::DELETE, &uri, Some(&token), None))
        .await
        .expect("withdraw enrolled");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
