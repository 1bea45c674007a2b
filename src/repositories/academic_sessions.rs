use sqlx::PgPool;

use crate::db::models::AcademicSession;

const COLUMNS: &str = "id, name, start_year, end_year, created_at, updated_at";

pub(crate) struct CreateSession<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) start_year: i32,
    pub(crate) end_year: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateSession {
    pub(crate) name: Option<String>,
    pub(crate) start_year: Option<i32>,
    pub(crate) end_year: Option<i32>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSession<'_>,
) -> Result<AcademicSession, sqlx::Error> {
    sqlx::query_as::<_, AcademicSession>(&format!(
        "INSERT INTO academic_sessions (id, name, start_year, end_year, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.start_year)
    .bind(params.end_year)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<AcademicSession>, sqlx::Error> {
    sqlx::query_as::<_, AcademicSession>(&format!(
        "SELECT {COLUMNS} FROM academic_sessions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM academic_sessions WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<AcademicSession>, sqlx::Error> {
    sqlx::query_as::<_, AcademicSession>(&format!(
        "SELECT {COLUMNS} FROM academic_sessions ORDER BY start_year DESC, name"
    ))
    .fetch_all(pool)
    .await
}

/// Returns `None` when no session has the given id.
pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateSession,
) -> Result<Option<AcademicSession>, sqlx::Error> {
    sqlx::query_as::<_, AcademicSession>(&format!(
        "UPDATE academic_sessions SET
            name = COALESCE($1, name),
            start_year = COALESCE($2, start_year),
            end_year = COALESCE($3, end_year),
            updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.start_year)
    .bind(params.end_year)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM academic_sessions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
