use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::core::time::primitive_now_utc;
use crate::db::models::Subject;
use crate::repositories;
use crate::schemas::academics::{SubjectCreate, SubjectImportError};

#[derive(Debug, Default)]
pub(crate) struct ImportOutcome {
    pub(crate) created: Vec<Subject>,
    pub(crate) errors: Vec<SubjectImportError>,
}

/// Creates each subject on its own; failures are collected per item.
pub(crate) async fn import_subjects(pool: &PgPool, items: Vec<serde_json::Value>) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();

    for (index, raw) in items.into_iter().enumerate() {
        let code = raw.get("code").and_then(|value| value.as_str()).map(str::to_string);
        match import_one(pool, raw).await {
            Ok(subject) => outcome.created.push(subject),
            Err(error) => outcome.errors.push(SubjectImportError { index, code, error }),
        }
    }

    tracing::info!(
        created = outcome.created.len(),
        failed = outcome.errors.len(),
        action = "subject_import",
        "Subject import finished"
    );
    outcome
}

async fn import_one(pool: &PgPool, raw: serde_json::Value) -> Result<Subject, String> {
    let payload: SubjectCreate = serde_json::from_value(raw).map_err(|err| err.to_string())?;
    payload.validate().map_err(|err| err.to_string())?;

    let code = payload.code.trim();
    let exists = repositories::subjects::exists_by_code(pool, code).await.map_err(|err| {
        tracing::error!(error = %err, "Failed to check subject code");
        "Failed to check subject code".to_string()
    })?;
    if exists {
        return Err(format!("Subject with code '{code}' already exists"));
    }

    let now = primitive_now_utc();
    repositories::subjects::create(
        pool,
        repositories::subjects::CreateSubject {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            code,
            class_id: payload.class_id.as_deref(),
            subject_group: payload.subject_group,
            category: payload.category,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|err| {
        if crate::db::is_unique_violation(&err) {
            format!("Subject with code '{code}' already exists")
        } else if crate::db::is_foreign_key_violation(&err) {
            "Class not found".to_string()
        } else {
            tracing::error!(error = %err, "Failed to create subject");
            "Failed to create subject".to_string()
        }
    })
}
