use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::models::{AcademicSession, ExamType, Student, Subject};
use crate::db::types::{StudyGroup, UserRole};
use crate::test_support::{self, TestContext};

struct Fixture {
    token: String,
    session: AcademicSession,
    exam_type: ExamType,
    subject: Subject,
    student: Student,
    other_student: Student,
}

async fn fixture(ctx: &TestContext) -> Fixture {
    let db = ctx.state.db();
    let teacher = test_support::insert_user(
        db,
        "teacher01",
        "Grading Teacher",
        "teacher-pass",
        UserRole::Teacher,
    )
    .await;
    let session = test_support::insert_session(db, "2024-2025", 2024).await;
    let class = test_support::insert_class(db, "Class Eleven", "XI").await;
    let subject = test_support::insert_subject(db, "Physics", "PHY-101", Some(&class.id)).await;
    let exam_type = test_support::insert_exam_type(db, "Mid-Term", true).await;
    let student = test_support::insert_student(db, "Rahim Uddin", "R-001", &class, &session).await;
    let other_student =
        test_support::insert_student(db, "Karim Ali", "R-002", &class, &session).await;
    test_support::enroll(db, &student, &subject, StudyGroup::Science).await;
    test_support::enroll(db, &other_student, &subject, StudyGroup::Business).await;

    Fixture {
        token: test_support::bearer_token(&teacher.id, ctx.state.settings()),
        session,
        exam_type,
        subject,
        student,
        other_student,
    }
}

fn mark_payload(fx: &Fixture, student: &Student, date: &str) -> serde_json::Value {
    json!({
        "exam_type_id": fx.exam_type.id,
        "exam_date": date,
        "student_id": student.id,
        "subject_id": fx.subject.id,
        "session_id": fx.session.id,
        "cq_marks": 45.0,
        "mct_marks": 25.0,
        "lab_marks": 10.0,
        "total_class": 10,
        "present": 8,
        "absent": 2
    })
}

async fn post_mark(
    ctx: &TestContext,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exam-marks",
            Some(token),
            Some(body),
        ))
        .await
        .expect("create mark");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

#[tokio::test]
async fn create_mark_derives_total_grade_and_attendance() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let (status, body) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_marks"], 80.0);
    assert_eq!(body["grade"], "A+");
    assert_eq!(body["attendance_percentage"], 80.0);
    assert_eq!(body["student_name"], "Rahim Uddin");
    assert_eq!(body["student_group"], "science");
    assert_eq!(body["exam_type_name"], "Mid-Term");
    assert_eq!(body["exam_date"], "2024-06-15");
}

#[tokio::test]
async fn create_mark_without_components_has_no_grade() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let mut payload = mark_payload(&fx, &fx.student, "2024-06-15");
    payload["cq_marks"] = serde_json::Value::Null;
    payload["mct_marks"] = serde_json::Value::Null;
    payload["lab_marks"] = serde_json::Value::Null;

    let (status, body) = post_mark(&ctx, &fx.token, payload).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["total_marks"].is_null());
    assert!(body["grade"].is_null());
}

#[tokio::test]
async fn create_ignores_client_supplied_total_and_grade() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let mut payload = mark_payload(&fx, &fx.student, "2024-06-15");
    payload["total_marks"] = json!(12);
    payload["grade"] = json!("F");

    let (status, body) = post_mark(&ctx, &fx.token, payload).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_marks"], 80.0);
    assert_eq!(body["grade"], "A+");
}

#[tokio::test]
async fn update_ignores_client_supplied_total_and_grade() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let (_, created) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;
    let uri = format!("/api/v1/exam-marks/{}", created["id"].as_str().expect("mark id"));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &uri,
            Some(&fx.token),
            Some(json!({ "cq_marks": 35.0, "total_marks": 12, "grade": "F" })),
        ))
        .await
        .expect("update mark");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_marks"], 70.0);
    assert_eq!(body["grade"], "A");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&fx.token), None))
        .await
        .expect("get mark");
    let body = test_support::read_json(response).await;
    assert_eq!(body["marks_summary"]["total_marks"], 70.0);
    assert_eq!(body["marks_summary"]["grade"], "A");
}

#[tokio::test]
async fn duplicate_occurrence_is_rejected_and_update_succeeds() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let (status, created) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_record");

    let mark_id = created["id"].as_str().expect("mark id");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/exam-marks/{mark_id}"),
            Some(&fx.token),
            Some(json!({ "remarks": "Rechecked", "lab_marks": 5.0 })),
        ))
        .await
        .expect("update mark");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["remarks"], "Rechecked");
    assert_eq!(body["total_marks"], 75.0);
    assert_eq!(body["grade"], "A");
}

#[tokio::test]
async fn inconsistent_attendance_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let mut payload = mark_payload(&fx, &fx.student, "2024-06-15");
    payload["present"] = json!(8);
    payload["absent"] = json!(3);

    let (status, body) = post_mark(&ctx, &fx.token, payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "attendance_inconsistent");
    assert_eq!(body["field"], "attendance");
}

#[tokio::test]
async fn unknown_reference_is_not_found() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let mut payload = mark_payload(&fx, &fx.student, "2024-06-15");
    payload["subject_id"] = json!("missing-subject");

    let (status, body) = post_mark(&ctx, &fx.token, payload).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "record_not_found");
}

#[tokio::test]
async fn student_role_cannot_write_marks() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;
    let pupil = test_support::insert_user(
        ctx.state.db(),
        "student01",
        "Student User",
        "student-pass",
        UserRole::Student,
    )
    .await;
    let token = test_support::bearer_token(&pupil.id, ctx.state.settings());

    let (status, body) =
        post_mark(&ctx, &token, mark_payload(&fx, &fx.student, "2024-06-15")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn report_averages_filtered_marks() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let mut first = mark_payload(&fx, &fx.student, "2024-06-15");
    first["cq_marks"] = json!(50.0);
    first["mct_marks"] = json!(20.0);
    first["lab_marks"] = json!(10.0);
    first["present"] = json!(10);
    first["absent"] = json!(0);
    let mut second = mark_payload(&fx, &fx.other_student, "2024-06-15");
    second["cq_marks"] = json!(30.0);
    second["mct_marks"] = json!(10.0);
    second["lab_marks"] = json!(0.0);
    second["present"] = json!(5);
    second["absent"] = json!(5);

    assert_eq!(post_mark(&ctx, &fx.token, first).await.0, StatusCode::CREATED);
    assert_eq!(post_mark(&ctx, &fx.token, second).await.0, StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exam-marks/report?subject_id={}", fx.subject.id),
            Some(&fx.token),
            None,
        ))
        .await
        .expect("report");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    let statistics = &body["statistics"];
    assert_eq!(statistics["total_records"], 2);
    assert_eq!(statistics["average_total_marks"], 60.0);
    assert_eq!(statistics["average_attendance_percentage"], 75.0);
    assert_eq!(statistics["pass_rate"], 100.0);
    assert_eq!(body["filters"]["subject_id"], fx.subject.id.as_str());
    assert_eq!(body["records"].as_array().expect("records").len(), 2);
}

#[tokio::test]
async fn list_filters_by_group_and_orders_newest_first() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    for (student, date) in [
        (&fx.student, "2024-03-01"),
        (&fx.student, "2024-06-15"),
        (&fx.other_student, "2024-05-01"),
    ] {
        let (status, _) = post_mark(&ctx, &fx.token, mark_payload(&fx, student, date)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exam-marks?group=science",
            Some(&fx.token),
            None,
        ))
        .await
        .expect("list");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 2);
    let items = body["items"].as_array().expect("items");
    assert_eq!(items[0]["exam_date"], "2024-06-15");
    assert_eq!(items[1]["exam_date"], "2024-03-01");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exam-marks?date_from=2024-04-01&date_to=2024-05-31",
            Some(&fx.token),
            None,
        ))
        .await
        .expect("list by date");
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["items"][0]["student_id"], fx.other_student.id.as_str());
}

#[tokio::test]
async fn get_and_delete_mark() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let (_, created) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;
    let mark_id = created["id"].as_str().expect("mark id").to_string();
    let uri = format!("/api/v1/exam-marks/{mark_id}");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&fx.token), None))
        .await
        .expect("get mark");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["student"]["roll_number"], "R-001");
    assert_eq!(body["subject"]["code"], "PHY-101");
    assert_eq!(body["marks_summary"]["grade"], "A+");
    assert_eq!(body["attendance_summary"]["percentage"], 80.0);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::DELETE, &uri, Some(&fx.token), None))
        .await
        .expect("delete mark");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&fx.token), None))
        .await
        .expect("get deleted mark");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_upsert_reports_partial_failures() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let mut bad = mark_payload(&fx, &fx.other_student, "2024-06-16");
    bad["present"] = json!(9);
    bad["absent"] = json!(5);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exam-marks/bulk",
            Some(&fx.token),
            Some(json!({
                "marks": [
                    mark_payload(&fx, &fx.student, "2024-06-15"),
                    bad,
                    mark_payload(&fx, &fx.other_student, "2024-06-15"),
                ]
            })),
        ))
        .await
        .expect("bulk upsert");

    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], "partial");
    assert_eq!(body["updated"], 2);
    assert_eq!(body["total"], 3);
    let errors = body["errors"].as_array().expect("errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["index"], 1);
    assert_eq!(errors[0]["code"], "attendance_inconsistent");
    assert_eq!(errors[0]["reference"]["student_id"], fx.other_student.id.as_str());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/exam-marks",
            Some(&fx.token),
            None,
        ))
        .await
        .expect("list");
    let body = test_support::read_json(response).await;
    assert_eq!(body["total_count"], 2);
}

#[tokio::test]
async fn bulk_update_of_unknown_mark_is_reported() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exam-marks/bulk",
            Some(&fx.token),
            Some(json!({ "marks": [{ "id": "no-such-mark", "remarks": "late" }] })),
        ))
        .await
        .expect("bulk upsert");

    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    let body = test_support::read_json(response).await;
    assert_eq!(body["updated"], 0);
    assert_eq!(body["errors"][0]["code"], "record_not_found");
    assert_eq!(body["errors"][0]["reference"]["id"], "no-such-mark");
}

#[tokio::test]
async fn bulk_rejects_empty_list() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exam-marks/bulk",
            Some(&fx.token),
            Some(json!({ "marks": [] })),
        ))
        .await
        .expect("bulk upsert");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["field"], "marks");
}

#[tokio::test]
async fn update_accepts_padded_ids() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;
    let final_exam = test_support::insert_exam_type(ctx.state.db(), "Final", true).await;

    let (_, created) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;
    let mark_id = created["id"].as_str().expect("mark id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/exam-marks/{mark_id}"),
            Some(&fx.token),
            Some(json!({
                "exam_type_id": format!("  {} ", final_exam.id),
                "student_id": format!(" {}", fx.student.id),
            })),
        ))
        .await
        .expect("update mark");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["exam_type_id"], final_exam.id.as_str());
    assert_eq!(body["exam_type_name"], "Final");
    assert_eq!(body["student_id"], fx.student.id.as_str());
}

#[tokio::test]
async fn bulk_update_merges_only_supplied_fields() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let (_, created) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;
    let mark_id = created["id"].as_str().expect("mark id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exam-marks/bulk",
            Some(&fx.token),
            Some(json!({
                "marks": [{ "id": mark_id, "lab_marks": 5.0, "remarks": "Lab retaken" }]
            })),
        ))
        .await
        .expect("bulk upsert");

    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["updated"], 1);
    assert_eq!(body["errors"].as_array().expect("errors").len(), 0);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/exam-marks/{mark_id}"),
            Some(&fx.token),
            None,
        ))
        .await
        .expect("get mark");
    let body = test_support::read_json(response).await;
    assert_eq!(body["lab_marks"], 5.0);
    assert_eq!(body["remarks"], "Lab retaken");
    assert_eq!(body["cq_marks"], 45.0);
    assert_eq!(body["mct_marks"], 25.0);
    assert_eq!(body["total_marks"], 75.0);
    assert_eq!(body["grade"], "A");
    assert_eq!(body["exam_date"], "2024-06-15");
    assert_eq!(body["student_id"], fx.student.id.as_str());
    assert_eq!(body["present"], 8);
    assert_eq!(body["absent"], 2);
}

#[tokio::test]
async fn moving_mark_onto_existing_occurrence_is_a_duplicate() {
    let ctx = test_support::setup_test_context().await;
    let fx = fixture(&ctx).await;

    let (status, _) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-15")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) =
        post_mark(&ctx, &fx.token, mark_payload(&fx, &fx.student, "2024-06-20")).await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = second["id"].as_str().expect("mark id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/exam-marks/bulk",
            Some(&fx.token),
            Some(json!({ "marks": [{ "id": second_id, "exam_date": "2024-06-15" }] })),
        ))
        .await
        .expect("bulk upsert");

    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    let body = test_support::read_json(response).await;
    assert_eq!(body["updated"], 0);
    assert_eq!(body["errors"][0]["index"], 0);
    assert_eq!(body["errors"][0]["code"], "duplicate_record");
    assert_eq!(body["errors"][0]["reference"]["id"], second_id.as_str());

    let uri = format!("/api/v1/exam-marks/{second_id}");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &uri,
            Some(&fx.token),
            Some(json!({ "exam_date": "2024-06-15" })),
        ))
        .await
        .expect("update mark");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = test_support::read_json(response).await;
    assert_eq!(body["code"], "duplicate_record");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, &uri, Some(&fx.token), None))
        .await
        .expect("get mark");
    let body = test_support::read_json(response).await;
    assert_eq!(body["exam_date"], "2024-06-20");
}
