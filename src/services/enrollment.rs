use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::StudentSubject;
use crate::db::types::StudyGroup;
use crate::repositories;

#[derive(Debug, Error)]
pub(crate) enum EnrollmentError {
    #[error("student not found: {0}")]
    StudentNotFound(String),
    #[error("subject not found: {0}")]
    SubjectNotFound(String),
    #[error("student {student_id} is not enrolled in subject {subject_id}")]
    NotEnrolled { student_id: String, subject_id: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Enrolls the student in the subject, or moves an existing enrollment to `group`.
pub(crate) async fn enroll(
    pool: &PgPool,
    student_id: &str,
    subject_id: &str,
    group: StudyGroup,
) -> Result<StudentSubject, EnrollmentError> {
    if !repositories::students::exists(pool, student_id).await? {
        return Err(EnrollmentError::StudentNotFound(student_id.to_string()));
    }
    if !repositories::subjects::exists(pool, subject_id).await? {
        return Err(EnrollmentError::SubjectNotFound(subject_id.to_string()));
    }

    let pairing = repositories::student_subjects::upsert(
        pool,
        repositories::student_subjects::EnrollSubject {
            id: &Uuid::new_v4().to_string(),
            student_id,
            subject_id,
            study_group: group,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    tracing::info!(
        student_id,
        subject_id,
        study_group = ?pairing.study_group,
        action = "enroll",
        "Student enrollment saved"
    );
    Ok(pairing)
}

pub(crate) async fn withdraw(
    pool: &PgPool,
    student_id: &str,
    subject_id: &str,
) -> Result<(), EnrollmentError> {
    if !repositories::student_subjects::delete(pool, student_id, subject_id).await? {
        return Err(EnrollmentError::NotEnrolled {
            student_id: student_id.to_string(),
            subject_id: subject_id.to_string(),
        });
    }
    tracing::info!(student_id, subject_id, action = "withdraw", "Student enrollment removed");
    Ok(())
}
