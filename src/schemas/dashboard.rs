use serde::Serialize;

use crate::repositories::dashboard::{LabelCount, Totals};
use crate::services::mark_reports::GradeBucket;

#[derive(Debug, Serialize)]
pub(crate) struct DashboardTotals {
    pub(crate) students: i64,
    pub(crate) teachers: i64,
    pub(crate) classes: i64,
    pub(crate) sessions: i64,
    pub(crate) subjects: i64,
    pub(crate) exam_types: i64,
    pub(crate) exam_marks: i64,
}

impl From<Totals> for DashboardTotals {
    fn from(totals: Totals) -> Self {
        Self {
            students: totals.students,
            teachers: totals.teachers,
            classes: totals.classes,
            sessions: totals.sessions,
            subjects: totals.subjects,
            exam_types: totals.exam_types,
            exam_marks: totals.exam_marks,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CountEntry {
    pub(crate) label: String,
    pub(crate) count: i64,
}

impl CountEntry {
    pub(crate) fn from_rows(rows: Vec<LabelCount>) -> Vec<Self> {
        rows.into_iter().map(|row| Self { label: row.label, count: row.count }).collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    pub(crate) totals: DashboardTotals,
    pub(crate) students_per_class: Vec<CountEntry>,
    pub(crate) students_per_session: Vec<CountEntry>,
    pub(crate) teachers_per_department: Vec<CountEntry>,
    pub(crate) marks_per_exam_type: Vec<CountEntry>,
    pub(crate) grade_distribution: Vec<GradeBucket>,
    pub(crate) pass_rate: f64,
}
