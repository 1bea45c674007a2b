pub(crate) mod academic_sessions;
pub(crate) mod classes;
pub(crate) mod dashboard;
pub(crate) mod exam_marks;
pub(crate) mod exam_types;
pub(crate) mod student_subjects;
pub(crate) mod students;
pub(crate) mod subjects;
pub(crate) mod teachers;
pub(crate) mod users;
