use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Teacher,
    Student,
    Staff,
}

/// Curriculum stream a subject belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "subjectgroup", rename_all = "lowercase")]
pub(crate) enum SubjectGroup {
    Science,
    Business,
    Humanities,
}

/// Stream declared for one student-subject pairing. Unlike [`SubjectGroup`] it still admits
/// `religion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "studygroup", rename_all = "lowercase")]
pub(crate) enum StudyGroup {
    Science,
    Business,
    Humanities,
    Religion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "subjectcategory", rename_all = "snake_case")]
pub(crate) enum SubjectCategory {
    Compulsory,
    GroupElective,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "teacherpost", rename_all = "snake_case")]
pub(crate) enum TeacherPost {
    Professor,
    AssociateProfessor,
    AssistantProfessor,
    Lecturer,
}

/// Letter grade derived from an exam mark total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "lettergrade")]
pub(crate) enum Grade {
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    #[sqlx(rename = "A")]
    A,
    #[serde(rename = "A-")]
    #[sqlx(rename = "A-")]
    AMinus,
    #[serde(rename = "B")]
    #[sqlx(rename = "B")]
    B,
    #[serde(rename = "C")]
    #[sqlx(rename = "C")]
    C,
    #[serde(rename = "F")]
    #[sqlx(rename = "F")]
    F,
}

impl Grade {
    pub(crate) const ALL: [Grade; 6] =
        [Grade::APlus, Grade::A, Grade::AMinus, Grade::B, Grade::C, Grade::F];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }

    pub(crate) fn is_passing(self) -> bool {
        self != Grade::F
    }
}
