use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;

pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Swish backend API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "campus": state.campus,
    }))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let db_state = state.clone();
    let (users, posts) = tokio::task::spawn_blocking(move || -> anyhow::Result<(i64, i64)> {
        Ok((db_state.db.count_users()?, db_state.db.count_posts()?))
    })
    .await?
    .map_err(ApiError::Internal)?;

    Ok(Json(json!({
        "users": users,
        "posts": posts,
        "campus": state.campus,
    })))
}
