pub mod auth;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod photos;
pub mod posts;
pub mod status;
pub mod token;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use chrono::{SecondsFormat, Utc};

use swish_db::Database;

use crate::photos::PhotoStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub admin_code: String,
    pub campus: String,
    /// Email domains accepted at registration, e.g. "sigce.edu".
    pub email_domains: Vec<String>,
    /// External photo storage; uploads are skipped when unconfigured.
    pub photos: Option<PhotoStore>,
}

/// Registration photo uploads are capped at 5 MB.
const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(status::index))
        .route("/stats", get(status::stats))
        .route(
            "/auth/register",
            post(auth::register).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        )
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/profile", put(auth::update_profile))
        .route("/posts", get(posts::get_posts).post(posts::create_post))
        .route("/posts/{post_id}/like", post(posts::toggle_like))
        .route("/posts/{post_id}/comment", post(posts::add_comment))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Server-side timestamps: RFC 3339 UTC with microsecond precision, so
/// lexicographic and chronological order agree in the store.
pub(crate) fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
