use sqlx::{FromRow, PgPool};

use crate::db::models::StudentSubject;
use crate::db::types::{StudyGroup, SubjectCategory, SubjectGroup};

const COLUMNS: &str = "id, student_id, subject_id, study_group, created_at";

pub(crate) struct EnrollSubject<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) subject_id: &'a str,
    pub(crate) study_group: StudyGroup,
    pub(crate) created_at: time::PrimitiveDateTime,
}

#[derive(Debug, FromRow)]
pub(crate) struct EnrolledSubjectRow {
    pub(crate) id: String,
    pub(crate) subject_id: String,
    pub(crate) subject_name: String,
    pub(crate) subject_code: String,
    pub(crate) subject_group: SubjectGroup,
    pub(crate) category: SubjectCategory,
    pub(crate) study_group: StudyGroup,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Inserts the pairing, or moves an existing pairing to the new group.
pub(crate) async fn upsert(
    pool: &PgPool,
    params: EnrollSubject<'_>,
) -> Result<StudentSubject, sqlx::Error> {
    sqlx::query_as::<_, StudentSubject>(&format!(
        "INSERT INTO student_subjects (id, student_id, subject_id, study_group, created_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (student_id, subject_id)
         DO UPDATE SET study_group = EXCLUDED.study_group
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.subject_id)
    .bind(params.study_group)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<EnrolledSubjectRow>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledSubjectRow>(
        "SELECT ss.id,
                ss.subject_id,
                sb.name AS subject_name,
                sb.code AS subject_code,
                sb.subject_group,
                sb.category,
                ss.study_group,
                ss.created_at
         FROM student_subjects ss
         JOIN subjects sb ON sb.id = ss.subject_id
         WHERE ss.student_id = $1
         ORDER BY sb.name, sb.code",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete(
    pool: &PgPool,
    student_id: &str,
    subject_id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM student_subjects WHERE student_id = $1 AND subject_id = $2")
            .bind(student_id)
            .bind(subject_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
