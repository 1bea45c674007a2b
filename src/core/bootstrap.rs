use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

const DEFAULT_EXAM_TYPES: [(&str, &str); 6] = [
    ("CT-Exam", "Class Test Examination"),
    ("Mid-Term", "Mid-Term Examination"),
    ("Half Yearly", "Half Yearly Examination"),
    ("Test", "General Test"),
    ("Pre-test", "Pre-test or Pre-exam"),
    ("Year Final", "Final Year Examination"),
];

pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let username = &admin.first_superuser_username;
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_username(state.db(), username).await? {
        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);

        if verified && user.role == UserRole::Admin && user.is_active {
            tracing::info!("Default superuser already up to date");
            return Ok(());
        }

        let hashed_password = if verified {
            user.hashed_password
        } else {
            security::hash_password(&admin.first_superuser_password)?
        };
        repositories::users::promote_to_admin(state.db(), &user.id, hashed_password, now).await?;
        tracing::info!("Updated default superuser {username}");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username,
            hashed_password,
            full_name: "Super Admin",
            role: UserRole::Admin,
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!("Created default superuser {username}");
    Ok(())
}

pub(crate) async fn ensure_default_exam_types(state: &AppState) -> anyhow::Result<()> {
    let now = primitive_now_utc();
    let mut created = 0usize;

    for (name, description) in DEFAULT_EXAM_TYPES {
        let inserted = repositories::exam_types::insert_if_missing(
            state.db(),
            repositories::exam_types::CreateExamType {
                id: &Uuid::new_v4().to_string(),
                name,
                description,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        )
        .await?;
        if inserted {
            created += 1;
        }
    }

    tracing::info!(created, "Default exam types ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn default_exam_types_are_seeded_once() {
        let ctx = test_support::setup_test_context().await;

        ensure_default_exam_types(&ctx.state).await.expect("first seed");
        ensure_default_exam_types(&ctx.state).await.expect("second seed");

        let types = repositories::exam_types::list(ctx.state.db(), false).await.expect("list");
        assert_eq!(types.len(), DEFAULT_EXAM_TYPES.len());
        assert!(types.iter().any(|exam_type| exam_type.name == "Year Final"));
    }
}
