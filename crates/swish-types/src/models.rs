use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role-specific profile payload. The serde tag doubles as the user's role
/// on the wire, so a flattened serialization yields a flat object carrying
/// `"role": "student"` next to the variant's own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Student {
        student_id: String,
        department: String,
        year: String,
    },
    Faculty {
        employee_id: String,
        department: String,
        designation: String,
    },
    Admin {
        permissions: Vec<String>,
    },
}

impl RoleProfile {
    pub fn role(&self) -> &'static str {
        match self {
            RoleProfile::Student { .. } => "student",
            RoleProfile::Faculty { .. } => "faculty",
            RoleProfile::Admin { .. } => "admin",
        }
    }

    pub fn department(&self) -> Option<&str> {
        match self {
            RoleProfile::Student { department, .. }
            | RoleProfile::Faculty { department, .. } => Some(department),
            RoleProfile::Admin { .. } => None,
        }
    }
}

/// A registered campus user. The password hash never leaves the process;
/// outward-facing payloads go through `api::UserResponse`, which drops it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub contact: String,
    pub photo_url: Option<String>,
    pub bio: String,
    pub skills: Vec<String>,
    pub campus: String,
    pub profile: RoleProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
