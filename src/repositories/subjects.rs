use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Subject;
use crate::db::types::{SubjectCategory, SubjectGroup};

const COLUMNS: &str = "id, name, code, class_id, subject_group, category, created_at, updated_at";

pub(crate) struct CreateSubject<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) code: &'a str,
    pub(crate) class_id: Option<&'a str>,
    pub(crate) subject_group: SubjectGroup,
    pub(crate) category: SubjectCategory,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateSubject {
    pub(crate) name: Option<String>,
    pub(crate) code: Option<String>,
    pub(crate) class_id: Option<String>,
    pub(crate) subject_group: Option<SubjectGroup>,
    pub(crate) category: Option<SubjectCategory>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

#[derive(Debug, Default)]
pub(crate) struct SubjectFilters {
    pub(crate) class_id: Option<String>,
    pub(crate) subject_group: Option<SubjectGroup>,
    pub(crate) category: Option<SubjectCategory>,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSubject<'_>,
) -> Result<Subject, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "INSERT INTO subjects (
            id, name, code, class_id, subject_group, category, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.code)
    .bind(params.class_id)
    .bind(params.subject_group)
    .bind(params.category)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!("SELECT {COLUMNS} FROM subjects WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn exists_by_code(
    executor: impl sqlx::PgExecutor<'_>,
    code: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE code = $1)")
        .bind(code)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    filters: &SubjectFilters,
) -> Result<Vec<Subject>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM subjects WHERE TRUE"));

    if let Some(class_id) = &filters.class_id {
        builder.push(" AND class_id = ");
        builder.push_bind(class_id.clone());
    }
    if let Some(group) = filters.subject_group {
        builder.push(" AND subject_group = ");
        builder.push_bind(group);
    }
    if let Some(category) = filters.category {
        builder.push(" AND category = ");
        builder.push_bind(category);
    }

    builder.push(" ORDER BY name, code");
    builder.build_query_as::<Subject>().fetch_all(pool).await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateSubject,
) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "UPDATE subjects SET
            name = COALESCE($1, name),
            code = COALESCE($2, code),
            class_id = COALESCE($3, class_id),
            subject_group = COALESCE($4, subject_group),
            category = COALESCE($5, category),
            updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.code)
    .bind(params.class_id)
    .bind(params.subject_group)
    .bind(params.category)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
