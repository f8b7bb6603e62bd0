use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{RoleProfile, User};

// -- JWT Claims --

/// Bearer-token claims. Canonical definition lives here in swish-types so
/// the token issuer and the auth middleware agree on a single shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both register (201) and login (200).
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// Partial profile update; omitted fields are left untouched. Email and
/// role are deliberately absent: neither is updatable once registered.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub employee_id: Option<String>,
    pub designation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Outward-facing projection of a user: password hash stripped, role
/// payload flattened so clients see a flat object tagged with `role`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub photo_url: Option<String>,
    pub bio: String,
    pub skills: Vec<String>,
    pub campus: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            contact: user.contact,
            photo_url: user.photo_url,
            bio: user.bio,
            skills: user.skills,
            campus: user.campus,
            profile: user.profile,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleLikeRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddCommentRequest {
    pub content: String,
    pub user_id: Uuid,
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub struct CommentAddedResponse {
    pub message: String,
    pub post: PostView,
}

// -- Feed --

/// A post joined with a projection of its author's public profile.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub author: PostAuthor,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub content: String,
    pub user_id: Uuid,
    /// Display name snapshot captured when the comment was written; never
    /// re-resolved against the user record.
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

/// Public author fields; `id` is absent when the author no longer resolves.
#[derive(Debug, Serialize)]
pub struct PostAuthor {
    pub id: Option<Uuid>,
    pub name: String,
    pub photo_url: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}
