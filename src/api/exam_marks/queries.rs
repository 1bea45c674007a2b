use serde::Deserialize;
use time::Date;

use crate::core::time::deserialize_option_date;
use crate::db::types::StudyGroup;
use crate::repositories::exam_marks::MarkFilters;

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct MarkFilterQuery {
    #[serde(default)]
    pub(super) exam_type_id: Option<String>,
    #[serde(default)]
    pub(super) subject_id: Option<String>,
    #[serde(default)]
    pub(super) session_id: Option<String>,
    #[serde(default, alias = "group")]
    pub(super) student_group: Option<StudyGroup>,
    #[serde(default)]
    pub(super) student_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(super) date_from: Option<Date>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(super) date_to: Option<Date>,
}

impl MarkFilterQuery {
    pub(super) fn to_filters(&self) -> MarkFilters {
        let non_blank = |value: &Option<String>| {
            value.as_deref().map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
        };
        MarkFilters {
            exam_type_id: non_blank(&self.exam_type_id),
            subject_id: non_blank(&self.subject_id),
            session_id: non_blank(&self.session_id),
            student_group: self.student_group,
            student_id: non_blank(&self.student_id),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListMarksQuery {
    #[serde(flatten)]
    pub(super) filters: MarkFilterQuery,
    #[serde(default)]
    pub(super) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(super) limit: i64,
}
