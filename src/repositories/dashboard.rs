use sqlx::{FromRow, PgPool};

use crate::db::types::Grade;

#[derive(Debug, FromRow)]
pub(crate) struct Totals {
    pub(crate) students: i64,
    pub(crate) teachers: i64,
    pub(crate) classes: i64,
    pub(crate) sessions: i64,
    pub(crate) subjects: i64,
    pub(crate) exam_types: i64,
    pub(crate) exam_marks: i64,
}

#[derive(Debug, FromRow)]
pub(crate) struct LabelCount {
    pub(crate) label: String,
    pub(crate) count: i64,
}

pub(crate) async fn totals(pool: &PgPool) -> Result<Totals, sqlx::Error> {
    sqlx::query_as::<_, Totals>(
        "SELECT (SELECT COUNT(*) FROM students) AS students,
                (SELECT COUNT(*) FROM teachers) AS teachers,
                (SELECT COUNT(*) FROM classes) AS classes,
                (SELECT COUNT(*) FROM academic_sessions) AS sessions,
                (SELECT COUNT(*) FROM subjects) AS subjects,
                (SELECT COUNT(*) FROM exam_types) AS exam_types,
                (SELECT COUNT(*) FROM exam_marks) AS exam_marks",
    )
    .fetch_one(pool)
    .await
}

pub(crate) async fn students_per_class(pool: &PgPool) -> Result<Vec<LabelCount>, sqlx::Error> {
    sqlx::query_as::<_, LabelCount>(
        "SELECT c.name AS label, COUNT(s.id) AS count
         FROM classes c
         LEFT JOIN students s ON s.class_id = c.id
         GROUP BY c.id, c.name
         ORDER BY c.name",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn students_per_session(pool: &PgPool) -> Result<Vec<LabelCount>, sqlx::Error> {
    sqlx::query_as::<_, LabelCount>(
        "SELECT se.name AS label, COUNT(s.id) AS count
         FROM academic_sessions se
         LEFT JOIN students s ON s.session_id = se.id
         GROUP BY se.id, se.name
         ORDER BY se.name",
    )
    .fetch_all(pool)
    .await
}

/// Teachers without a department are grouped under an empty label.
pub(crate) async fn teachers_per_department(
    pool: &PgPool,
) -> Result<Vec<LabelCount>, sqlx::Error> {
    sqlx::query_as::<_, LabelCount>(
        "SELECT COALESCE(department, '') AS label, COUNT(*) AS count
         FROM teachers
         GROUP BY COALESCE(department, '')
         ORDER BY label",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn marks_per_exam_type(pool: &PgPool) -> Result<Vec<LabelCount>, sqlx::Error> {
    sqlx::query_as::<_, LabelCount>(
        "SELECT et.name AS label, COUNT(m.id) AS count
         FROM exam_types et
         LEFT JOIN exam_marks m ON m.exam_type_id = et.id
         GROUP BY et.id, et.name
         ORDER BY et.name",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn grade_counts(pool: &PgPool) -> Result<Vec<(Option<Grade>, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (Option<Grade>, i64)>(
        "SELECT grade, COUNT(*) FROM exam_marks GROUP BY grade",
    )
    .fetch_all(pool)
    .await
}
