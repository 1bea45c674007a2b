//! Exam-mark writes: validation, derived total/grade and the transactional create/update path.

use sqlx::PgPool;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::ExamMark;
use crate::db::types::Grade;
use crate::repositories;
use crate::repositories::exam_marks::{MarkValues, OccurrenceKey};

#[derive(Debug, Error)]
pub(crate) enum GradingError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error(
        "present ({present}) + absent ({absent}) cannot exceed total classes ({total_class})"
    )]
    AttendanceInconsistent { total_class: i32, present: i32, absent: i32 },
    #[error("Marks already exist for this exam type, date, student, subject and session")]
    DuplicateRecord,
    #[error("{entity} not found: {id}")]
    RecordNotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl GradingError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::RecordNotFound { entity, id: id.to_string() }
    }

    pub(crate) fn code(&self) -> &'static str {
        match self {
            GradingError::Validation { .. } => "validation_error",
            GradingError::AttendanceInconsistent { .. } => "attendance_inconsistent",
            GradingError::DuplicateRecord => "duplicate_record",
            GradingError::RecordNotFound { .. } => "record_not_found",
            GradingError::Database(_) => "internal_error",
        }
    }

    /// Payload field the error is reported under.
    pub(crate) fn field(&self) -> &'static str {
        match self {
            GradingError::Validation { field, .. } => field,
            GradingError::AttendanceInconsistent { .. } => "attendance",
            GradingError::DuplicateRecord => "exam_mark",
            GradingError::RecordNotFound { entity, .. } => match *entity {
                "exam type" => "exam_type_id",
                "student" => "student_id",
                "subject" => "subject_id",
                "session" => "session_id",
                _ => "id",
            },
            GradingError::Database(_) => "exam_mark",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Components {
    pub(crate) cq_marks: Option<f64>,
    pub(crate) mct_marks: Option<f64>,
    pub(crate) lab_marks: Option<f64>,
}

impl Components {
    fn validate(&self) -> Result<(), GradingError> {
        let fields = [
            ("cq_marks", self.cq_marks),
            ("mct_marks", self.mct_marks),
            ("lab_marks", self.lab_marks),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if !value.is_finite() {
                    let message = format!("{field} must be a number");
                    return Err(GradingError::validation(field, message));
                }
                if value < 0.0 {
                    return Err(GradingError::validation(
                        field,
                        format!("{field} must be greater than or equal to 0"),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Attendance {
    pub(crate) total_class: i32,
    pub(crate) present: i32,
    pub(crate) absent: i32,
}

impl Attendance {
    pub(crate) fn validate(&self) -> Result<(), GradingError> {
        for (field, value) in
            [("total_class", self.total_class), ("present", self.present), ("absent", self.absent)]
        {
            if value < 0 {
                return Err(GradingError::validation(
                    field,
                    format!("{field} must be greater than or equal to 0"),
                ));
            }
        }

        // Widened so that huge counters cannot overflow the sum.
        if i64::from(self.present) + i64::from(self.absent) > i64::from(self.total_class) {
            return Err(GradingError::AttendanceInconsistent {
                total_class: self.total_class,
                present: self.present,
                absent: self.absent,
            });
        }
        Ok(())
    }

    /// `present / total_class * 100`, rounded to 2 decimals; 0 when no classes were held.
    pub(crate) fn percentage(&self) -> f64 {
        if self.total_class <= 0 {
            return 0.0;
        }
        round2(f64::from(self.present) / f64::from(self.total_class) * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Derived {
    pub(crate) total_marks: Option<f64>,
    pub(crate) grade: Option<Grade>,
}

pub(crate) fn compute_derived(components: &Components) -> Derived {
    let present = [components.cq_marks, components.mct_marks, components.lab_marks]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    if present.is_empty() {
        return Derived { total_marks: None, grade: None };
    }

    // Components carry two decimals; rounding keeps binary drift off the grade thresholds.
    let total = round2(present.iter().sum::<f64>());
    Derived { total_marks: Some(total), grade: Some(grade_for_total(total)) }
}

/// Totals are read as a percentage; there is no upper bound.
pub(crate) fn grade_for_total(total: f64) -> Grade {
    if total >= 80.0 {
        Grade::APlus
    } else if total >= 70.0 {
        Grade::A
    } else if total >= 60.0 {
        Grade::AMinus
    } else if total >= 50.0 {
        Grade::B
    } else if total >= 40.0 {
        Grade::C
    } else {
        Grade::F
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone)]
pub(crate) struct NewExamMark {
    pub(crate) exam_type_id: String,
    pub(crate) exam_date: Date,
    pub(crate) student_id: String,
    pub(crate) subject_id: String,
    pub(crate) session_id: String,
    pub(crate) components: Components,
    pub(crate) attendance: Attendance,
    pub(crate) remarks: Option<String>,
}

/// Partial update. `None` keeps the stored value; `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExamMarkChanges {
    pub(crate) exam_type_id: Option<String>,
    pub(crate) exam_date: Option<Date>,
    pub(crate) student_id: Option<String>,
    pub(crate) subject_id: Option<String>,
    pub(crate) session_id: Option<String>,
    pub(crate) cq_marks: Option<Option<f64>>,
    pub(crate) mct_marks: Option<Option<f64>>,
    pub(crate) lab_marks: Option<Option<f64>>,
    pub(crate) total_class: Option<i32>,
    pub(crate) present: Option<i32>,
    pub(crate) absent: Option<i32>,
    pub(crate) remarks: Option<Option<String>>,
}

impl ExamMarkChanges {
    fn merge(self, current: &ExamMark) -> NewExamMark {
        NewExamMark {
            exam_type_id: self.exam_type_id.unwrap_or_else(|| current.exam_type_id.clone()),
            exam_date: self.exam_date.unwrap_or(current.exam_date),
            student_id: self.student_id.unwrap_or_else(|| current.student_id.clone()),
            subject_id: self.subject_id.unwrap_or_else(|| current.subject_id.clone()),
            session_id: self.session_id.unwrap_or_else(|| current.session_id.clone()),
            components: Components {
                cq_marks: self.cq_marks.unwrap_or(current.cq_marks),
                mct_marks: self.mct_marks.unwrap_or(current.mct_marks),
                lab_marks: self.lab_marks.unwrap_or(current.lab_marks),
            },
            attendance: Attendance {
                total_class: self.total_class.unwrap_or(current.total_class),
                present: self.present.unwrap_or(current.present),
                absent: self.absent.unwrap_or(current.absent),
            },
            remarks: self.remarks.unwrap_or_else(|| current.remarks.clone()),
        }
    }
}

impl NewExamMark {
    fn validate(&self) -> Result<Derived, GradingError> {
        self.components.validate()?;
        self.attendance.validate()?;
        Ok(compute_derived(&self.components))
    }

    fn values(&self, derived: Derived) -> MarkValues<'_> {
        MarkValues {
            exam_type_id: &self.exam_type_id,
            exam_date: self.exam_date,
            student_id: &self.student_id,
            subject_id: &self.subject_id,
            session_id: &self.session_id,
            cq_marks: self.components.cq_marks,
            mct_marks: self.components.mct_marks,
            lab_marks: self.components.lab_marks,
            total_marks: derived.total_marks,
            grade: derived.grade,
            total_class: self.attendance.total_class,
            present: self.attendance.present,
            absent: self.attendance.absent,
            remarks: self.remarks.as_deref(),
        }
    }

    fn occurrence(&self) -> OccurrenceKey<'_> {
        OccurrenceKey {
            exam_type_id: &self.exam_type_id,
            exam_date: self.exam_date,
            student_id: &self.student_id,
            subject_id: &self.subject_id,
            session_id: &self.session_id,
        }
    }
}

pub(crate) async fn record_mark(
    pool: &PgPool,
    input: NewExamMark,
) -> Result<ExamMark, GradingError> {
    let derived = input.validate()?;

    let mut tx = pool.begin().await?;

    let exam_type = repositories::exam_types::find_by_id(&mut *tx, &input.exam_type_id)
        .await?
        .ok_or_else(|| GradingError::not_found("exam type", &input.exam_type_id))?;
    if !exam_type.is_active {
        return Err(GradingError::validation(
            "exam_type_id",
            format!("Exam type '{}' is not active", exam_type.name),
        ));
    }
    ensure_references(&mut tx, &input).await?;

    if repositories::exam_marks::exists_for_occurrence(&mut *tx, &input.occurrence()).await? {
        return Err(GradingError::DuplicateRecord);
    }

    let id = Uuid::new_v4().to_string();
    let mark = repositories::exam_marks::insert(
        &mut *tx,
        &id,
        &input.values(derived),
        primitive_now_utc(),
    )
    .await
    .map_err(map_write_error)?;

    tx.commit().await?;

    metrics::record_mark_write("create");
    tracing::info!(
        mark_id = %mark.id,
        action = "create",
        student_id = %mark.student_id,
        grade = mark.grade.map(Grade::as_str).unwrap_or("-"),
        "Exam mark recorded"
    );
    Ok(mark)
}

pub(crate) async fn update_mark(
    pool: &PgPool,
    id: &str,
    changes: ExamMarkChanges,
) -> Result<ExamMark, GradingError> {
    let mut tx = pool.begin().await?;

    let current = repositories::exam_marks::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| GradingError::not_found("exam mark", id))?;

    let merged = changes.merge(&current);
    let derived = merged.validate()?;

    if merged.exam_type_id != current.exam_type_id
        && repositories::exam_types::find_by_id(&mut *tx, &merged.exam_type_id).await?.is_none()
    {
        return Err(GradingError::not_found("exam type", &merged.exam_type_id));
    }
    ensure_references(&mut tx, &merged).await?;

    let mark = repositories::exam_marks::update(
        &mut *tx,
        id,
        &merged.values(derived),
        primitive_now_utc(),
    )
    .await
    .map_err(map_write_error)?;

    tx.commit().await?;

    metrics::record_mark_write("update");
    tracing::info!(mark_id = %mark.id, action = "update", "Exam mark updated");
    Ok(mark)
}

pub(crate) async fn delete_mark(pool: &PgPool, id: &str) -> Result<(), GradingError> {
    if !repositories::exam_marks::delete(pool, id).await? {
        return Err(GradingError::not_found("exam mark", id));
    }

    metrics::record_mark_write("delete");
    tracing::info!(mark_id = %id, action = "delete", "Exam mark deleted");
    Ok(())
}

async fn ensure_references(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    mark: &NewExamMark,
) -> Result<(), GradingError> {
    if !repositories::students::exists(&mut **tx, &mark.student_id).await? {
        return Err(GradingError::not_found("student", &mark.student_id));
    }
    if !repositories::subjects::exists(&mut **tx, &mark.subject_id).await? {
        return Err(GradingError::not_found("subject", &mark.subject_id));
    }
    if !repositories::academic_sessions::exists(&mut **tx, &mark.session_id).await? {
        return Err(GradingError::not_found("session", &mark.session_id));
    }
    Ok(())
}

fn map_write_error(error: sqlx::Error) -> GradingError {
    if crate::db::is_unique_violation(&error) {
        return GradingError::DuplicateRecord;
    }
    if crate::db::is_foreign_key_violation(&error) {
        // A referenced row vanished between the existence check and the write.
        let entity = match crate::db::violated_constraint(&error) {
            Some(name) if name.contains("exam_type") => "exam type",
            Some(name) if name.contains("student") => "student",
            Some(name) if name.contains("subject") => "subject",
            Some(name) if name.contains("session") => "session",
            _ => "reference",
        };
        return GradingError::RecordNotFound { entity, id: String::new() };
    }
    GradingError::Database(error)
}
