use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Teacher;
use crate::db::types::TeacherPost;

fn default_post() -> TeacherPost {
    TeacherPost::Lecturer
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TeacherCreate {
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    pub(crate) subject_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email is not a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default = "default_post")]
    pub(crate) post: TeacherPost,
    #[serde(default)]
    pub(crate) qualification: Option<String>,
    #[serde(default)]
    pub(crate) department: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TeacherUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    pub(crate) subject_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email is not a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) post: Option<TeacherPost>,
    #[serde(default)]
    pub(crate) qualification: Option<String>,
    #[serde(default)]
    pub(crate) department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeacherListQuery {
    #[serde(default)]
    pub(crate) department: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) user_id: Option<String>,
    pub(crate) subject_id: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) post: TeacherPost,
    pub(crate) qualification: Option<String>,
    pub(crate) department: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl TeacherResponse {
    pub(crate) fn from_db(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            name: teacher.name,
            user_id: teacher.user_id,
            subject_id: teacher.subject_id,
            phone: teacher.phone,
            email: teacher.email,
            post: teacher.post,
            qualification: teacher.qualification,
            department: teacher.department,
            created_at: format_primitive(teacher.created_at),
            updated_at: format_primitive(teacher.updated_at),
        }
    }
}
