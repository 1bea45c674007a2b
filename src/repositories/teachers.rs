use sqlx::PgPool;

use crate::db::models::Teacher;
use crate::db::types::TeacherPost;

const COLUMNS: &str = "\
    id, name, user_id, subject_id, phone, email, post, qualification, department, \
    created_at, updated_at";

pub(crate) struct CreateTeacher<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) user_id: Option<&'a str>,
    pub(crate) subject_id: Option<&'a str>,
    pub(crate) phone: Option<&'a str>,
    pub(crate) email: Option<&'a str>,
    pub(crate) post: TeacherPost,
    pub(crate) qualification: Option<&'a str>,
    pub(crate) department: Option<&'a str>,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateTeacher {
    pub(crate) name: Option<String>,
    pub(crate) user_id: Option<String>,
    pub(crate) subject_id: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) post: Option<TeacherPost>,
    pub(crate) qualification: Option<String>,
    pub(crate) department: Option<String>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateTeacher<'_>,
) -> Result<Teacher, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!(
        "INSERT INTO teachers (
            id, name, user_id, subject_id, phone, email, post, qualification, department,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.user_id)
    .bind(params.subject_id)
    .bind(params.phone)
    .bind(params.email)
    .bind(params.post)
    .bind(params.qualification)
    .bind(params.department)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!("SELECT {COLUMNS} FROM teachers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    department: Option<&str>,
) -> Result<Vec<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!(
        "SELECT {COLUMNS} FROM teachers
         WHERE ($1::TEXT IS NULL OR department = $1)
         ORDER BY name, id"
    ))
    .bind(department)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateTeacher,
) -> Result<Option<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!(
        "UPDATE teachers SET
            name = COALESCE($1, name),
            user_id = COALESCE($2, user_id),
            subject_id = COALESCE($3, subject_id),
            phone = COALESCE($4, phone),
            email = COALESCE($5, email),
            post = COALESCE($6, post),
            qualification = COALESCE($7, qualification),
            department = COALESCE($8, department),
            updated_at = $9
         WHERE id = $10
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.user_id)
    .bind(params.subject_id)
    .bind(params.phone)
    .bind(params.email)
    .bind(params.post)
    .bind(params.qualification)
    .bind(params.department)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM teachers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
