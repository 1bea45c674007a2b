use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::Date;

use crate::db::models::ExamMark;
use crate::db::types::{Grade, StudyGroup};

pub(crate) const COLUMNS: &str = "\
    id, exam_type_id, exam_date, student_id, subject_id, session_id, \
    cq_marks, mct_marks, lab_marks, total_marks, grade, \
    total_class, present, absent, remarks, created_at, updated_at";

const ROW_SELECT: &str = "\
    SELECT m.id, m.exam_type_id, et.name AS exam_type_name, m.exam_date, \
           m.student_id, st.name AS student_name, st.roll_number AS student_roll, \
           ss.study_group AS student_group, \
           m.subject_id, sb.name AS subject_name, sb.code AS subject_code, \
           m.session_id, se.name AS session_name, \
           m.cq_marks, m.mct_marks, m.lab_marks, m.total_marks, m.grade, \
           m.total_class, m.present, m.absent, m.remarks, m.created_at, m.updated_at \
    FROM exam_marks m \
    JOIN exam_types et ON et.id = m.exam_type_id \
    JOIN students st ON st.id = m.student_id \
    JOIN subjects sb ON sb.id = m.subject_id \
    JOIN academic_sessions se ON se.id = m.session_id \
    LEFT JOIN student_subjects ss \
           ON ss.student_id = m.student_id AND ss.subject_id = m.subject_id \
    WHERE TRUE";

const ROW_ORDER: &str = " ORDER BY m.exam_date DESC, st.roll_number ASC, sb.name ASC, m.id ASC";

/// Every stored column of a mark except the timestamps; derived fields already computed.
pub(crate) struct MarkValues<'a> {
    pub(crate) exam_type_id: &'a str,
    pub(crate) exam_date: Date,
    pub(crate) student_id: &'a str,
    pub(crate) subject_id: &'a str,
    pub(crate) session_id: &'a str,
    pub(crate) cq_marks: Option<f64>,
    pub(crate) mct_marks: Option<f64>,
    pub(crate) lab_marks: Option<f64>,
    pub(crate) total_marks: Option<f64>,
    pub(crate) grade: Option<Grade>,
    pub(crate) total_class: i32,
    pub(crate) present: i32,
    pub(crate) absent: i32,
    pub(crate) remarks: Option<&'a str>,
}

pub(crate) struct OccurrenceKey<'a> {
    pub(crate) exam_type_id: &'a str,
    pub(crate) exam_date: Date,
    pub(crate) student_id: &'a str,
    pub(crate) subject_id: &'a str,
    pub(crate) session_id: &'a str,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MarkFilters {
    pub(crate) exam_type_id: Option<String>,
    pub(crate) subject_id: Option<String>,
    pub(crate) session_id: Option<String>,
    pub(crate) student_group: Option<StudyGroup>,
    pub(crate) student_id: Option<String>,
    pub(crate) date_from: Option<Date>,
    pub(crate) date_to: Option<Date>,
}

/// A mark joined with the display names of everything it references.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ExamMarkRow {
    pub(crate) id: String,
    pub(crate) exam_type_id: String,
    pub(crate) exam_type_name: String,
    pub(crate) exam_date: Date,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_roll: String,
    pub(crate) student_group: Option<StudyGroup>,
    pub(crate) subject_id: String,
    pub(crate) subject_name: String,
    pub(crate) subject_code: String,
    pub(crate) session_id: String,
    pub(crate) session_name: String,
    pub(crate) cq_marks: Option<f64>,
    pub(crate) mct_marks: Option<f64>,
    pub(crate) lab_marks: Option<f64>,
    pub(crate) total_marks: Option<f64>,
    pub(crate) grade: Option<Grade>,
    pub(crate) total_class: i32,
    pub(crate) present: i32,
    pub(crate) absent: i32,
    pub(crate) remarks: Option<String>,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn insert(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    values: &MarkValues<'_>,
    now: time::PrimitiveDateTime,
) -> Result<ExamMark, sqlx::Error> {
    sqlx::query_as::<_, ExamMark>(&format!(
        "INSERT INTO exam_marks (
            id, exam_type_id, exam_date, student_id, subject_id, session_id,
            cq_marks, mct_marks, lab_marks, total_marks, grade,
            total_class, present, absent, remarks, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(values.exam_type_id)
    .bind(values.exam_date)
    .bind(values.student_id)
    .bind(values.subject_id)
    .bind(values.session_id)
    .bind(values.cq_marks)
    .bind(values.mct_marks)
    .bind(values.lab_marks)
    .bind(values.total_marks)
    .bind(values.grade)
    .bind(values.total_class)
    .bind(values.present)
    .bind(values.absent)
    .bind(values.remarks)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamMark>, sqlx::Error> {
    sqlx::query_as::<_, ExamMark>(&format!("SELECT {COLUMNS} FROM exam_marks WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Locks the row until the surrounding transaction ends.
pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamMark>, sqlx::Error> {
    sqlx::query_as::<_, ExamMark>(&format!(
        "SELECT {COLUMNS} FROM exam_marks WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn exists_for_occurrence(
    executor: impl sqlx::PgExecutor<'_>,
    key: &OccurrenceKey<'_>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM exam_marks
            WHERE exam_type_id = $1 AND exam_date = $2 AND student_id = $3
              AND subject_id = $4 AND session_id = $5
         )",
    )
    .bind(key.exam_type_id)
    .bind(key.exam_date)
    .bind(key.student_id)
    .bind(key.subject_id)
    .bind(key.session_id)
    .fetch_one(executor)
    .await
}

/// Overwrites every stored column with the merged values.
pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    values: &MarkValues<'_>,
    now: time::PrimitiveDateTime,
) -> Result<ExamMark, sqlx::Error> {
    sqlx::query_as::<_, ExamMark>(&format!(
        "UPDATE exam_marks SET
            exam_type_id = $1,
            exam_date = $2,
            student_id = $3,
            subject_id = $4,
            session_id = $5,
            cq_marks = $6,
            mct_marks = $7,
            lab_marks = $8,
            total_marks = $9,
            grade = $10,
            total_class = $11,
            present = $12,
            absent = $13,
            remarks = $14,
            updated_at = $15
         WHERE id = $16
         RETURNING {COLUMNS}",
    ))
    .bind(values.exam_type_id)
    .bind(values.exam_date)
    .bind(values.student_id)
    .bind(values.subject_id)
    .bind(values.session_id)
    .bind(values.cq_marks)
    .bind(values.mct_marks)
    .bind(values.lab_marks)
    .bind(values.total_marks)
    .bind(values.grade)
    .bind(values.total_class)
    .bind(values.present)
    .bind(values.absent)
    .bind(values.remarks)
    .bind(now)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exam_marks WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &MarkFilters) {
    if let Some(exam_type_id) = &filters.exam_type_id {
        builder.push(" AND m.exam_type_id = ");
        builder.push_bind(exam_type_id.clone());
    }
    if let Some(subject_id) = &filters.subject_id {
        builder.push(" AND m.subject_id = ");
        builder.push_bind(subject_id.clone());
    }
    if let Some(session_id) = &filters.session_id {
        builder.push(" AND m.session_id = ");
        builder.push_bind(session_id.clone());
    }
    if let Some(group) = filters.student_group {
        builder.push(" AND ss.study_group = ");
        builder.push_bind(group);
    }
    if let Some(student_id) = &filters.student_id {
        builder.push(" AND m.student_id = ");
        builder.push_bind(student_id.clone());
    }
    if let Some(date_from) = filters.date_from {
        builder.push(" AND m.exam_date >= ");
        builder.push_bind(date_from);
    }
    if let Some(date_to) = filters.date_to {
        builder.push(" AND m.exam_date <= ");
        builder.push_bind(date_to);
    }
}

pub(crate) async fn list_rows(
    pool: &PgPool,
    filters: &MarkFilters,
    skip: i64,
    limit: i64,
) -> Result<Vec<ExamMarkRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(ROW_SELECT);
    push_filters(&mut builder, filters);

    builder.push(ROW_ORDER);
    builder.push(" OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<ExamMarkRow>().fetch_all(pool).await
}

/// The full filtered slice, used by the report.
pub(crate) async fn list_all_rows(
    pool: &PgPool,
    filters: &MarkFilters,
) -> Result<Vec<ExamMarkRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(ROW_SELECT);
    push_filters(&mut builder, filters);
    builder.push(ROW_ORDER);
    builder.build_query_as::<ExamMarkRow>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filters: &MarkFilters) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*)
         FROM exam_marks m
         LEFT JOIN student_subjects ss
                ON ss.student_id = m.student_id AND ss.subject_id = m.subject_id
         WHERE TRUE",
    );
    push_filters(&mut builder, filters);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn find_row(pool: &PgPool, id: &str) -> Result<Option<ExamMarkRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(ROW_SELECT);
    builder.push(" AND m.id = ");
    builder.push_bind(id.to_string());
    builder.build_query_as::<ExamMarkRow>().fetch_optional(pool).await
}
