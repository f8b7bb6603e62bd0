use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use swish_types::api::{
    AddCommentRequest, Claims, CommentAddedResponse, CreatePostRequest, PostView,
    ToggleLikeRequest,
};

use crate::error::ApiError;
use crate::{AppState, feed, now_ts};

/// Same cap the post composer enforces.
const MAX_CONTENT_LEN: usize = 500;

pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostView>), ApiError> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::EmptyContent("Post"));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(ApiError::Validation(format!(
            "post content must be at most {MAX_CONTENT_LEN} characters"
        )));
    }

    let post_id = Uuid::new_v4();
    let db_state = state.clone();
    let author_id = claims.sub.to_string();
    tokio::task::spawn_blocking(move || {
        let now = now_ts();
        db_state
            .db
            .insert_post(&post_id.to_string(), &author_id, &content, None, &now, &now)
    })
    .await?
    .map_err(ApiError::Internal)?;

    let view = feed::view_post(&state, post_id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_posts(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let db_state = state.clone();
    let rows = tokio::task::spawn_blocking(move || db_state.db.get_posts())
        .await?
        .map_err(ApiError::Internal)?;

    let views = feed::enrich_all(&state, rows).await?;
    Ok(Json(views))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<ToggleLikeRequest>,
) -> Result<Json<PostView>, ApiError> {
    let db_state = state.clone();
    let pid = post_id.to_string();
    let uid = req.user_id.to_string();
    let toggled =
        tokio::task::spawn_blocking(move || db_state.db.toggle_like(&pid, &uid, &now_ts()))
            .await?
            .map_err(ApiError::Internal)?;

    if toggled.is_none() {
        return Err(ApiError::PostNotFound);
    }

    let view = feed::view_post(&state, post_id).await?;
    Ok(Json(view))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<AddCommentRequest>,
) -> Result<Json<CommentAddedResponse>, ApiError> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::EmptyContent("Comment"));
    }

    let db_state = state.clone();
    let pid = post_id.to_string();
    let uid = req.user_id.to_string();
    let user_name = req.user_name;
    let appended = tokio::task::spawn_blocking(move || {
        db_state.db.add_comment(
            &Uuid::new_v4().to_string(),
            &pid,
            &uid,
            &user_name,
            &content,
            &now_ts(),
        )
    })
    .await?
    .map_err(ApiError::Internal)?;

    if !appended {
        return Err(ApiError::PostNotFound);
    }

    let post = feed::view_post(&state, post_id).await?;
    Ok(Json(CommentAddedResponse {
        message: "Comment added successfully".into(),
        post,
    }))
}
