use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::ExamType;
use crate::schemas::exam_mark::ExamMarkResponse;

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamTypeCreate {
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default = "default_true")]
    pub(crate) is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamTypeUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "name must be 1-50 characters"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExamTypeListQuery {
    #[serde(default)]
    pub(crate) active_only: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamTypeResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamTypeResponse {
    pub(crate) fn from_db(exam_type: ExamType) -> Self {
        Self {
            id: exam_type.id,
            name: exam_type.name,
            description: exam_type.description,
            is_active: exam_type.is_active,
            created_at: format_primitive(exam_type.created_at),
            updated_at: format_primitive(exam_type.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamTypeMarksResponse {
    pub(crate) exam_type: ExamTypeResponse,
    pub(crate) count: usize,
    pub(crate) marks: Vec<ExamMarkResponse>,
}
