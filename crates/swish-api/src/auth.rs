use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, warn};
use uuid::Uuid;

use swish_db::models::{ProfileUpdate, UserRow};
use swish_types::api::{
    AuthResponse, Claims, LoginRequest, ProfileResponse, UpdateProfileRequest,
};
use swish_types::models::{RoleProfile, User};

use crate::error::ApiError;
use crate::{AppState, now_ts, token};

/// Newly created admins start with the fixed moderation permission set.
const DEFAULT_ADMIN_PERMISSIONS: [&str; 2] = ["manage_users", "moderate_content"];

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Default)]
struct RegisterForm {
    name: String,
    email: String,
    password: String,
    contact: String,
    role: String,
    student_id: Option<String>,
    department: Option<String>,
    year: Option<String>,
    employee_id: Option<String>,
    designation: Option<String>,
    admin_code: Option<String>,
    photo: Option<Photo>,
}

struct Photo {
    content_type: String,
    bytes: Vec<u8>,
}

pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let mut form = read_register_form(multipart).await?;
    let photo = form.photo.take();

    // The asset lands in external storage before the user record exists;
    // every failure below must delete it again.
    let photo_url = match (&state.photos, photo) {
        (Some(store), Some(photo)) => Some(
            store
                .upload(&photo.content_type, photo.bytes)
                .await
                .map_err(ApiError::Internal)?,
        ),
        (None, Some(_)) => {
            warn!("Photo upload skipped: no photo store configured");
            None
        }
        _ => None,
    };

    match create_account(&state, form, photo_url.clone()).await {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(err) => {
            // Compensating action: a failed registration must not leak the
            // already-stored asset.
            if let (Some(store), Some(url)) = (&state.photos, photo_url) {
                if let Err(e) = store.delete(&url).await {
                    error!("Failed to delete orphaned photo {}: {:#}", url, e);
                }
            }
            Err(err)
        }
    }
}

async fn read_register_form(mut multipart: Multipart) -> Result<RegisterForm, ApiError> {
    let mut form = RegisterForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed_form)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "photo" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            if !content_type.starts_with("image/") {
                return Err(ApiError::Validation("Only image files are allowed".into()));
            }
            let bytes = field.bytes().await.map_err(malformed_form)?;
            form.photo = Some(Photo {
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(malformed_form)?;
        match name.as_str() {
            "name" => form.name = value,
            "email" => form.email = value,
            "password" => form.password = value,
            "contact" => form.contact = value,
            "role" => form.role = value,
            "student_id" => form.student_id = Some(value),
            "department" => form.department = Some(value),
            "year" => form.year = Some(value),
            "employee_id" => form.employee_id = Some(value),
            "designation" => form.designation = Some(value),
            "admin_code" => form.admin_code = Some(value),
            // unknown fields are ignored, like any permissive form parser
            _ => {}
        }
    }

    Ok(form)
}

fn malformed_form(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Validation(format!("Malformed form data: {e}"))
}

async fn create_account(
    state: &AppState,
    form: RegisterForm,
    photo_url: Option<String>,
) -> Result<AuthResponse, ApiError> {
    validate_registration(state, &form)?;
    let profile = build_profile(state, &form)?;

    // The pre-check gives the specific failure; the unique constraint on
    // email still backstops a racing insert.
    let db_state = state.clone();
    let email = form.email.trim().to_string();
    let existing = tokio::task::spawn_blocking(move || db_state.db.get_user_by_email(&email))
        .await?
        .map_err(ApiError::Internal)?;
    if existing.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password = form.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await?
        .map_err(ApiError::Internal)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password_hash,
        contact: form.contact,
        photo_url,
        bio: String::new(),
        skills: Vec::new(),
        campus: state.campus.clone(),
        profile,
        created_at: now,
        updated_at: now,
    };

    let row = user_to_row(&user).map_err(ApiError::Internal)?;
    let db_state = state.clone();
    let inserted = tokio::task::spawn_blocking(move || db_state.db.create_user(&row))
        .await?
        .map_err(ApiError::Internal)?;
    if !inserted {
        return Err(ApiError::DuplicateEmail);
    }

    let token = token::issue(&state.jwt_secret, user.id).map_err(ApiError::Internal)?;

    Ok(AuthResponse {
        message: "User created successfully".into(),
        token,
        user: user.into(),
    })
}

fn validate_registration(state: &AppState, form: &RegisterForm) -> Result<(), ApiError> {
    for (value, field) in [
        (&form.name, "name"),
        (&form.email, "email"),
        (&form.password, "password"),
        (&form.contact, "contact"),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{field} is required")));
        }
    }

    if form.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let email = form.email.trim();
    let allowed = state
        .email_domains
        .iter()
        .any(|domain| email.ends_with(&format!("@{domain}")));
    if !allowed {
        return Err(ApiError::Validation(
            "Please use your university email address".into(),
        ));
    }

    Ok(())
}

fn build_profile(state: &AppState, form: &RegisterForm) -> Result<RoleProfile, ApiError> {
    // An absent role falls back to student, the common case on campus.
    let role = form.role.trim();
    let role = if role.is_empty() { "student" } else { role };

    match role {
        "student" => Ok(RoleProfile::Student {
            student_id: form.student_id.clone().unwrap_or_default(),
            department: form.department.clone().unwrap_or_default(),
            year: form.year.clone().unwrap_or_default(),
        }),
        "faculty" => Ok(RoleProfile::Faculty {
            employee_id: form.employee_id.clone().unwrap_or_default(),
            department: form.department.clone().unwrap_or_default(),
            designation: form.designation.clone().unwrap_or_default(),
        }),
        "admin" => {
            if form.admin_code.as_deref() != Some(state.admin_code.as_str()) {
                return Err(ApiError::InvalidAdminCode);
            }
            Ok(RoleProfile::Admin {
                permissions: DEFAULT_ADMIN_PERMISSIONS
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
            })
        }
        other => Err(ApiError::Validation(format!(
            "role must be student, faculty, or admin (got '{other}')"
        ))),
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();
    Ok(hash)
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let db_state = state.clone();
    // One failure kind for unknown email and wrong password alike, so the
    // endpoint cannot be used to enumerate accounts.
    let row = tokio::task::spawn_blocking(move || -> Result<UserRow, ApiError> {
        let row = db_state
            .db
            .get_user_by_email(req.email.trim())
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&row.password)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {e}")))?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .map_err(|_| ApiError::InvalidCredentials)?;

        Ok(row)
    })
    .await??;

    let user = user_from_row(row).map_err(ApiError::Internal)?;
    let token = token::issue(&state.jwt_secret, user.id).map_err(ApiError::Internal)?;

    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let skills = req
        .skills
        .map(|s| serde_json::to_string(&s))
        .transpose()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("skills encoding failed: {e}")))?;

    let fields = ProfileUpdate {
        name: req.name,
        contact: req.contact,
        bio: req.bio,
        skills,
        student_id: req.student_id,
        department: req.department,
        year: req.year,
        employee_id: req.employee_id,
        designation: req.designation,
    };

    let db_state = state.clone();
    let user_id = claims.sub.to_string();
    let row = tokio::task::spawn_blocking(move || -> Result<UserRow, ApiError> {
        let updated = db_state
            .db
            .update_profile(&user_id, &fields, &now_ts())
            .map_err(ApiError::Internal)?;
        if !updated {
            return Err(ApiError::UserNotFound);
        }

        db_state
            .db
            .get_user_by_id(&user_id)
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::UserNotFound)
    })
    .await??;

    let user = user_from_row(row).map_err(ApiError::Internal)?;
    Ok(Json(ProfileResponse {
        message: "Profile updated successfully".into(),
        user: user.into(),
    }))
}

pub(crate) fn user_from_row(row: UserRow) -> anyhow::Result<User> {
    let profile = match row.role.as_str() {
        "student" => RoleProfile::Student {
            student_id: row.student_id.unwrap_or_default(),
            department: row.department.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
        },
        "faculty" => RoleProfile::Faculty {
            employee_id: row.employee_id.unwrap_or_default(),
            department: row.department.unwrap_or_default(),
            designation: row.designation.unwrap_or_default(),
        },
        "admin" => RoleProfile::Admin {
            permissions: row
                .permissions
                .as_deref()
                .map(serde_json::from_str::<Vec<String>>)
                .transpose()?
                .unwrap_or_default(),
        },
        other => anyhow::bail!("unknown role '{}' on user {}", other, row.id),
    };

    Ok(User {
        id: row.id.parse()?,
        name: row.name,
        email: row.email,
        password_hash: row.password,
        contact: row.contact,
        photo_url: row.photo_url,
        bio: row.bio,
        skills: serde_json::from_str(&row.skills)?,
        campus: row.campus,
        profile,
        created_at: row.created_at.parse::<DateTime<Utc>>()?,
        updated_at: row.updated_at.parse::<DateTime<Utc>>()?,
    })
}

fn user_to_row(user: &User) -> anyhow::Result<UserRow> {
    let (student_id, department, year, employee_id, designation, permissions) =
        match &user.profile {
            RoleProfile::Student {
                student_id,
                department,
                year,
            } => (
                Some(student_id.clone()),
                Some(department.clone()),
                Some(year.clone()),
                None,
                None,
                None,
            ),
            RoleProfile::Faculty {
                employee_id,
                department,
                designation,
            } => (
                None,
                Some(department.clone()),
                None,
                Some(employee_id.clone()),
                Some(designation.clone()),
                None,
            ),
            RoleProfile::Admin { permissions } => (
                None,
                None,
                None,
                None,
                None,
                Some(serde_json::to_string(permissions)?),
            ),
        };

    Ok(UserRow {
        id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        password: user.password_hash.clone(),
        contact: user.contact.clone(),
        role: user.profile.role().to_string(),
        photo_url: user.photo_url.clone(),
        bio: user.bio.clone(),
        skills: serde_json::to_string(&user.skills)?,
        campus: user.campus.clone(),
        student_id,
        department,
        year,
        employee_id,
        designation,
        permissions,
        created_at: user.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        updated_at: user.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}
