use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;

use crate::db::models::Student;
use crate::db::types::StudyGroup;

const COLUMNS: &str = "\
    id, name, roll_number, class_id, session_id, email, phone, address, \
    date_of_birth, created_at, updated_at";

pub(crate) struct CreateStudent<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) roll_number: &'a str,
    pub(crate) class_id: &'a str,
    pub(crate) session_id: &'a str,
    pub(crate) email: Option<&'a str>,
    pub(crate) phone: Option<&'a str>,
    pub(crate) address: Option<&'a str>,
    pub(crate) date_of_birth: Option<Date>,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateStudent {
    pub(crate) name: Option<String>,
    pub(crate) roll_number: Option<String>,
    pub(crate) class_id: Option<String>,
    pub(crate) session_id: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) date_of_birth: Option<Date>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

#[derive(Debug, Default)]
pub(crate) struct StudentFilters {
    pub(crate) class_id: Option<String>,
    pub(crate) session_id: Option<String>,
    /// Matches students enrolled in at least one subject under this group.
    pub(crate) study_group: Option<StudyGroup>,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (
            id, name, roll_number, class_id, session_id, email, phone, address,
            date_of_birth, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.roll_number)
    .bind(params.class_id)
    .bind(params.session_id)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.address)
    .bind(params.date_of_birth)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &StudentFilters) {
    if let Some(class_id) = &filters.class_id {
        builder.push(" AND s.class_id = ");
        builder.push_bind(class_id.clone());
    }
    if let Some(session_id) = &filters.session_id {
        builder.push(" AND s.session_id = ");
        builder.push_bind(session_id.clone());
    }
    if let Some(group) = filters.study_group {
        builder.push(
            " AND EXISTS (SELECT 1 FROM student_subjects ss \
             WHERE ss.student_id = s.id AND ss.study_group = ",
        );
        builder.push_bind(group);
        builder.push(")");
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    filters: &StudentFilters,
    skip: i64,
    limit: i64,
) -> Result<Vec<Student>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT s.id, s.name, s.roll_number, s.class_id, s.session_id, s.email, s.phone,
                s.address, s.date_of_birth, s.created_at, s.updated_at
         FROM students s
         WHERE TRUE",
    );
    push_filters(&mut builder, filters);

    builder.push(" ORDER BY s.roll_number, s.id OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Student>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filters: &StudentFilters) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students s WHERE TRUE");
    push_filters(&mut builder, filters);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateStudent,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "UPDATE students SET
            name = COALESCE($1, name),
            roll_number = COALESCE($2, roll_number),
            class_id = COALESCE($3, class_id),
            session_id = COALESCE($4, session_id),
            email = COALESCE($5, email),
            phone = COALESCE($6, phone),
            address = COALESCE($7, address),
            date_of_birth = COALESCE($8, date_of_birth),
            updated_at = $9
         WHERE id = $10
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.roll_number)
    .bind(params.class_id)
    .bind(params.session_id)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.address)
    .bind(params.date_of_birth)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
