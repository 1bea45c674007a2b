use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::core::time::{deserialize_option_date, format_date, format_primitive};
use crate::db::models::{Student, Subject};
use crate::db::types::{Grade, StudyGroup, SubjectCategory, SubjectGroup};
use crate::repositories::exam_marks::{ExamMarkRow, MarkFilters};
use crate::services::grading::{
    Attendance, Components, ExamMarkChanges, GradingError, NewExamMark,
};
use crate::services::mark_reports::MarkStatistics;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Body shared by create, partial update and bulk items. Which fields are
/// required depends on the operation, so everything is optional here.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExamMarkPayload {
    #[serde(default)]
    pub(crate) exam_type_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(crate) exam_date: Option<Date>,
    #[serde(default)]
    pub(crate) student_id: Option<String>,
    #[serde(default)]
    pub(crate) subject_id: Option<String>,
    #[serde(default)]
    pub(crate) session_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub(crate) cq_marks: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub(crate) mct_marks: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub(crate) lab_marks: Option<Option<f64>>,
    #[serde(default)]
    pub(crate) total_class: Option<i32>,
    #[serde(default)]
    pub(crate) present: Option<i32>,
    #[serde(default)]
    pub(crate) absent: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub(crate) remarks: Option<Option<String>>,
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, GradingError> {
    value.ok_or_else(|| GradingError::validation(field, format!("{field} is required")))
}

fn required_id(field: &'static str, value: Option<String>) -> Result<String, GradingError> {
    let value = required(field, value)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GradingError::validation(field, format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional_id(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, GradingError> {
    value.map(|id| required_id(field, Some(id))).transpose()
}

fn normalize_remarks(remarks: Option<String>) -> Option<String> {
    remarks.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}

impl ExamMarkPayload {
    pub(crate) fn into_new_mark(self) -> Result<NewExamMark, GradingError> {
        Ok(NewExamMark {
            exam_type_id: required_id("exam_type_id", self.exam_type_id)?,
            exam_date: required("exam_date", self.exam_date)?,
            student_id: required_id("student_id", self.student_id)?,
            subject_id: required_id("subject_id", self.subject_id)?,
            session_id: required_id("session_id", self.session_id)?,
            components: Components {
                cq_marks: self.cq_marks.flatten(),
                mct_marks: self.mct_marks.flatten(),
                lab_marks: self.lab_marks.flatten(),
            },
            attendance: Attendance {
                total_class: self.total_class.unwrap_or(0),
                present: self.present.unwrap_or(0),
                absent: self.absent.unwrap_or(0),
            },
            remarks: normalize_remarks(self.remarks.flatten()),
        })
    }

    pub(crate) fn into_changes(self) -> Result<ExamMarkChanges, GradingError> {
        Ok(ExamMarkChanges {
            exam_type_id: optional_id("exam_type_id", self.exam_type_id)?,
            exam_date: self.exam_date,
            student_id: optional_id("student_id", self.student_id)?,
            subject_id: optional_id("subject_id", self.subject_id)?,
            session_id: optional_id("session_id", self.session_id)?,
            cq_marks: self.cq_marks,
            mct_marks: self.mct_marks,
            lab_marks: self.lab_marks,
            total_class: self.total_class,
            present: self.present,
            absent: self.absent,
            remarks: self.remarks.map(normalize_remarks),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkMarkItem {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(flatten)]
    pub(crate) fields: ExamMarkPayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkMarkRequest {
    pub(crate) marks: Vec<serde_json::Value>,
}

/// Filters echoed back in a report, with dates in calendar form.
#[derive(Debug, Serialize)]
pub(crate) struct AppliedFilters {
    pub(crate) exam_type_id: Option<String>,
    pub(crate) subject_id: Option<String>,
    pub(crate) session_id: Option<String>,
    pub(crate) student_group: Option<StudyGroup>,
    pub(crate) student_id: Option<String>,
    pub(crate) date_from: Option<String>,
    pub(crate) date_to: Option<String>,
}

impl AppliedFilters {
    pub(crate) fn from_filters(filters: &MarkFilters) -> Self {
        Self {
            exam_type_id: filters.exam_type_id.clone(),
            subject_id: filters.subject_id.clone(),
            session_id: filters.session_id.clone(),
            student_group: filters.student_group,
            student_id: filters.student_id.clone(),
            date_from: filters.date_from.map(format_date),
            date_to: filters.date_to.map(format_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamMarkResponse {
    pub(crate) id: String,
    pub(crate) exam_type_id: String,
    pub(crate) exam_type_name: String,
    pub(crate) exam_date: String,
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
    pub(crate) attendance_percentage: f64,
    pub(crate) remarks: Option<String>,
}

impl ExamMarkResponse {
    pub(crate) fn from_row(row: ExamMarkRow) -> Self {
        let attendance = Attendance {
            total_class: row.total_class,
            present: row.present,
            absent: row.absent,
        };
        Self {
            id: row.id,
            exam_type_id: row.exam_type_id,
            exam_type_name: row.exam_type_name,
            exam_date: format_date(row.exam_date),
            student_id: row.student_id,
            student_name: row.student_name,
            student_roll: row.student_roll,
            student_group: row.student_group,
            subject_id: row.subject_id,
            subject_name: row.subject_name,
            subject_code: row.subject_code,
            session_id: row.session_id,
            session_name: row.session_name,
            cq_marks: row.cq_marks,
            mct_marks: row.mct_marks,
            lab_marks: row.lab_marks,
            total_marks: row.total_marks,
            grade: row.grade,
            total_class: row.total_class,
            present: row.present,
            absent: row.absent,
            attendance_percentage: attendance.percentage(),
            remarks: row.remarks,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) roll_number: String,
    pub(crate) class_id: String,
    pub(crate) session_id: String,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) class_id: Option<String>,
    pub(crate) subject_group: SubjectGroup,
    pub(crate) category: SubjectCategory,
}

#[derive(Debug, Serialize)]
pub(crate) struct MarksSummary {
    pub(crate) cq_marks: Option<f64>,
    pub(crate) mct_marks: Option<f64>,
    pub(crate) lab_marks: Option<f64>,
    pub(crate) total_marks: Option<f64>,
    pub(crate) grade: Option<Grade>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttendanceSummary {
    pub(crate) total_class: i32,
    pub(crate) present: i32,
    pub(crate) absent: i32,
    pub(crate) percentage: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamMarkDetailResponse {
    #[serde(flatten)]
    pub(crate) mark: ExamMarkResponse,
    pub(crate) student: StudentSummary,
    pub(crate) subject: SubjectSummary,
    pub(crate) marks_summary: MarksSummary,
    pub(crate) attendance_summary: AttendanceSummary,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamMarkDetailResponse {
    pub(crate) fn new(row: ExamMarkRow, student: Student, subject: Subject) -> Self {
        let created_at = format_primitive(row.created_at);
        let updated_at = format_primitive(row.updated_at);
        let mark = ExamMarkResponse::from_row(row);

        Self {
            student: StudentSummary {
                id: student.id,
                name: student.name,
                roll_number: student.roll_number,
                class_id: student.class_id,
                session_id: student.session_id,
                email: student.email,
                phone: student.phone,
            },
            subject: SubjectSummary {
                id: subject.id,
                name: subject.name,
                code: subject.code,
                class_id: subject.class_id,
                subject_group: subject.subject_group,
                category: subject.category,
            },
            marks_summary: MarksSummary {
                cq_marks: mark.cq_marks,
                mct_marks: mark.mct_marks,
                lab_marks: mark.lab_marks,
                total_marks: mark.total_marks,
                grade: mark.grade,
            },
            attendance_summary: AttendanceSummary {
                total_class: mark.total_class,
                present: mark.present,
                absent: mark.absent,
                percentage: mark.attendance_percentage,
            },
            mark,
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkReportResponse {
    pub(crate) filters: AppliedFilters,
    pub(crate) statistics: MarkStatistics,
    pub(crate) records: Vec<ExamMarkResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BulkItemReference {
    pub(crate) id: Option<String>,
    pub(crate) student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BulkItemError {
    pub(crate) index: usize,
    pub(crate) reference: BulkItemReference,
    pub(crate) code: &'static str,
    pub(crate) errors: std::collections::BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BulkStatus {
    Success,
    Partial,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkMarkResponse {
    pub(crate) status: BulkStatus,
    pub(crate) updated: usize,
    pub(crate) total: usize,
    pub(crate) errors: Vec<BulkItemError>,
}
