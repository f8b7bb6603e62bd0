//! Database row types mapping directly to SQLite rows. Distinct from the
//! swish-types domain models to keep the DB layer independent; the API
//! crate owns the conversion.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub contact: String,
    pub role: String,
    pub photo_url: Option<String>,
    pub bio: String,
    pub skills: String,
    pub campus: String,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub employee_id: Option<String>,
    pub designation: Option<String>,
    pub permissions: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct PostRow {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct LikeRow {
    pub post_id: String,
    pub user_id: String,
}

pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub created_at: String,
}

/// Public author projection joined into the feed.
pub struct AuthorRow {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub role: String,
    pub department: Option<String>,
}

/// Partial profile update; `None` leaves the column untouched.
#[derive(Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub employee_id: Option<String>,
    pub designation: Option<String>,
}
