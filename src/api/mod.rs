pub(crate) mod auth;
pub(crate) mod classes;
pub(crate) mod dashboard;
pub(crate) mod errors;
pub(crate) mod exam_marks;
pub(crate) mod exam_types;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod pagination;
pub(crate) mod router;
pub(crate) mod sessions;
pub(crate) mod students;
pub(crate) mod subjects;
pub(crate) mod teachers;
pub(crate) mod validation;
