use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Organisational role of a user. Gates how far their visibility reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Designation {
    Recruiter,
    Mentor,
    Manager,
    Admin,
    Finance,
    Other,
}

impl Designation {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("recruiter") {
            Designation::Recruiter
        } else if value.eq_ignore_ascii_case("mentor") {
            Designation::Mentor
        } else if value.eq_ignore_ascii_case("manager") {
            Designation::Manager
        } else if value.eq_ignore_ascii_case("admin") {
            Designation::Admin
        } else if value.eq_ignore_ascii_case("finance") {
            Designation::Finance
        } else {
            Designation::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Designation::Recruiter => "Recruiter",
            Designation::Mentor => "Mentor",
            Designation::Manager => "Manager",
            Designation::Admin => "Admin",
            Designation::Finance => "Finance",
            Designation::Other => "Other",
        }
    }

    /// Mentors and managers also see candidates on jobs they are staffed on.
    pub fn receives_assignment_grant(&self) -> bool {
        matches!(self, Designation::Mentor | Designation::Manager)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub designation: Designation,
    pub reporter: Option<Uuid>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub designation: String,
    pub reporter: Option<Uuid>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserRecord> for User {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            designation: Designation::parse(&value.designation),
            reporter: value.reporter,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}
