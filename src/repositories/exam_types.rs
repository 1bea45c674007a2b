use sqlx::PgPool;

use crate::db::models::ExamType;

const COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

pub(crate) struct CreateExamType<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: &'a str,
    pub(crate) is_active: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateExamType {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) is_active: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateExamType<'_>,
) -> Result<ExamType, sqlx::Error> {
    sqlx::query_as::<_, ExamType>(&format!(
        "INSERT INTO exam_types (id, name, description, is_active, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.is_active)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

/// Inserts the type unless one with the same name exists. Returns whether a row was written.
pub(crate) async fn insert_if_missing(
    pool: &PgPool,
    params: CreateExamType<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO exam_types (id, name, description, is_active, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.is_active)
    .bind(params.created_at)
    .bind(params.updated_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamType>, sqlx::Error> {
    sqlx::query_as::<_, ExamType>(&format!("SELECT {COLUMNS} FROM exam_types WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<ExamType>, sqlx::Error> {
    sqlx::query_as::<_, ExamType>(&format!(
        "SELECT {COLUMNS} FROM exam_types
         WHERE ($1 = FALSE OR is_active)
         ORDER BY name"
    ))
    .bind(active_only)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExamType,
) -> Result<Option<ExamType>, sqlx::Error> {
    sqlx::query_as::<_, ExamType>(&format!(
        "UPDATE exam_types SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            is_active = COALESCE($3, is_active),
            updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.description)
    .bind(params.is_active)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exam_types WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
