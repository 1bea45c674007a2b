use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::time::format_primitive;
use crate::db::models::{AcademicSession, Class, Subject};
use crate::db::types::{SubjectCategory, SubjectGroup};

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_session_years"))]
pub(crate) struct SessionCreate {
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(range(min = 1900, max = 2200, message = "start_year is out of range"))]
    pub(crate) start_year: i32,
    #[validate(range(min = 1900, max = 2200, message = "end_year is out of range"))]
    pub(crate) end_year: i32,
}

fn validate_session_years(payload: &SessionCreate) -> Result<(), ValidationError> {
    if payload.end_year < payload.start_year {
        let mut error = ValidationError::new("year_order");
        error.message = Some("end_year must not be before start_year".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SessionUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1900, max = 2200, message = "start_year is out of range"))]
    pub(crate) start_year: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 1900, max = 2200, message = "end_year is out of range"))]
    pub(crate) end_year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) start_year: i32,
    pub(crate) end_year: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl SessionResponse {
    pub(crate) fn from_db(session: AcademicSession) -> Self {
        Self {
            id: session.id,
            name: session.name,
            start_year: session.start_year,
            end_year: session.end_year,
            created_at: format_primitive(session.created_at),
            updated_at: format_primitive(session.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ClassCreate {
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub(crate) code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ClassUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub(crate) code: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ClassResponse {
    pub(crate) fn from_db(class: Class) -> Self {
        Self {
            id: class.id,
            name: class.name,
            code: class.code,
            created_at: format_primitive(class.created_at),
            updated_at: format_primitive(class.updated_at),
        }
    }
}

fn default_subject_group() -> SubjectGroup {
    SubjectGroup::Science
}

fn default_subject_category() -> SubjectCategory {
    SubjectCategory::Compulsory
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubjectCreate {
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) class_id: Option<String>,
    #[serde(default = "default_subject_group", alias = "group")]
    pub(crate) subject_group: SubjectGroup,
    #[serde(default = "default_subject_category")]
    pub(crate) category: SubjectCategory,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SubjectUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) class_id: Option<String>,
    #[serde(default, alias = "group")]
    pub(crate) subject_group: Option<SubjectGroup>,
    #[serde(default)]
    pub(crate) category: Option<SubjectCategory>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubjectListQuery {
    #[serde(default)]
    pub(crate) class_id: Option<String>,
    #[serde(default, alias = "group")]
    pub(crate) subject_group: Option<SubjectGroup>,
    #[serde(default)]
    pub(crate) category: Option<SubjectCategory>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) class_id: Option<String>,
    pub(crate) subject_group: SubjectGroup,
    pub(crate) category: SubjectCategory,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl SubjectResponse {
    pub(crate) fn from_db(subject: Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            code: subject.code,
            class_id: subject.class_id,
            subject_group: subject.subject_group,
            category: subject.category,
            created_at: format_primitive(subject.created_at),
            updated_at: format_primitive(subject.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectImportRequest {
    pub(crate) subjects: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectImportError {
    pub(crate) index: usize,
    pub(crate) code: Option<String>,
    pub(crate) error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectImportResponse {
    pub(crate) created: Vec<SubjectResponse>,
    pub(crate) total_created: usize,
    pub(crate) total_errors: usize,
    pub(crate) errors: Vec<SubjectImportError>,
}
