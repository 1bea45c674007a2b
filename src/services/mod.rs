pub(crate) mod bulk_marks;
pub(crate) mod enrollment;
pub(crate) mod grading;
pub(crate) mod mark_reports;
pub(crate) mod subject_import;
