use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::api::pagination::default_limit;
use crate::core::time::{deserialize_option_date, format_date, format_primitive};
use crate::db::models::{Student, StudentSubject};
use crate::db::types::{StudyGroup, SubjectCategory, SubjectGroup};
use crate::repositories::student_subjects::EnrolledSubjectRow;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentCreate {
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(length(min = 1, max = 20, message = "roll_number must be 1-20 characters"))]
    pub(crate) roll_number: String,
    pub(crate) class_id: String,
    pub(crate) session_id: String,
    #[serde(default)]
    #[validate(email(message = "email is not a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(crate) date_of_birth: Option<Date>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "roll_number must be 1-20 characters"))]
    pub(crate) roll_number: Option<String>,
    #[serde(default)]
    pub(crate) class_id: Option<String>,
    #[serde(default)]
    pub(crate) session_id: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email is not a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(crate) date_of_birth: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentListQuery {
    #[serde(default)]
    pub(crate) class_id: Option<String>,
    #[serde(default)]
    pub(crate) session_id: Option<String>,
    #[serde(default, alias = "group")]
    pub(crate) study_group: Option<StudyGroup>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) roll_number: String,
    pub(crate) class_id: String,
    pub(crate) session_id: String,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) date_of_birth: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl StudentResponse {
    pub(crate) fn from_db(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            roll_number: student.roll_number,
            class_id: student.class_id,
            session_id: student.session_id,
            email: student.email,
            phone: student.phone,
            address: student.address,
            date_of_birth: student.date_of_birth.map(format_date),
            created_at: format_primitive(student.created_at),
            updated_at: format_primitive(student.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentDetailResponse {
    #[serde(flatten)]
    pub(crate) student: StudentResponse,
    pub(crate) subjects: Vec<EnrolledSubjectResponse>,
}

fn default_study_group() -> StudyGroup {
    StudyGroup::Science
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentRequest {
    pub(crate) subject_id: String,
    #[serde(default = "default_study_group", alias = "group")]
    pub(crate) study_group: StudyGroup,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) subject_id: String,
    pub(crate) study_group: StudyGroup,
    pub(crate) created_at: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(pairing: StudentSubject) -> Self {
        Self {
            id: pairing.id,
            student_id: pairing.student_id,
            subject_id: pairing.subject_id,
            study_group: pairing.study_group,
            created_at: format_primitive(pairing.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrolledSubjectResponse {
    pub(crate) id: String,
    pub(crate) subject_id: String,
    pub(crate) subject_name: String,
    pub(crate) subject_code: String,
    pub(crate) subject_group: SubjectGroup,
    pub(crate) category: SubjectCategory,
    pub(crate) study_group: StudyGroup,
    pub(crate) created_at: String,
}

impl EnrolledSubjectResponse {
    pub(crate) fn from_row(row: EnrolledSubjectRow) -> Self {
        Self {
            id: row.id,
            subject_id: row.subject_id,
            subject_name: row.subject_name,
            subject_code: row.subject_code,
            subject_group: row.subject_group,
            category: row.category,
            study_group: row.study_group,
            created_at: format_primitive(row.created_at),
        }
    }
}
