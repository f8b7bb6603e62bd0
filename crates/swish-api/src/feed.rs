use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use swish_db::models::{AuthorRow, CommentRow, LikeRow, PostRow};
use swish_types::api::{CommentView, PostAuthor, PostView};

use crate::AppState;
use crate::error::ApiError;

/// Display name substituted when a post's author no longer resolves; the
/// feed always renders.
const UNKNOWN_AUTHOR: &str = "Unknown User";

pub async fn view_post(state: &AppState, post_id: Uuid) -> Result<PostView, ApiError> {
    let db_state = state.clone();
    let pid = post_id.to_string();
    let row = tokio::task::spawn_blocking(move || db_state.db.get_post(&pid))
        .await?
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::PostNotFound)?;

    let mut views = enrich_all(state, vec![row]).await?;
    views
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("enrichment dropped the post")))
}

/// Join posts with their likes, comments and the authors' public profiles.
/// One batched query per collection, grouped in memory; reads only.
pub async fn enrich_all(state: &AppState, posts: Vec<PostRow>) -> Result<Vec<PostView>, ApiError> {
    if posts.is_empty() {
        return Ok(vec![]);
    }

    let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let author_ids: Vec<String> = posts
        .iter()
        .map(|p| p.author_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let db_state = state.clone();
    let (likes, comments, authors) = tokio::task::spawn_blocking(
        move || -> anyhow::Result<(Vec<LikeRow>, Vec<CommentRow>, Vec<AuthorRow>)> {
            let likes = db_state.db.get_likes_for_posts(&post_ids)?;
            let comments = db_state.db.get_comments_for_posts(&post_ids)?;
            let authors = db_state.db.get_authors_by_ids(&author_ids)?;
            Ok((likes, comments, authors))
        },
    )
    .await?
    .map_err(ApiError::Internal)?;

    // Group by post id; the grouping preserves the per-post append order
    // the queries return.
    let mut likes_map: HashMap<String, Vec<Uuid>> = HashMap::new();
    for like in &likes {
        if let Ok(uid) = like.user_id.parse::<Uuid>() {
            likes_map.entry(like.post_id.clone()).or_default().push(uid);
        }
    }

    let mut comments_map: HashMap<String, Vec<CommentView>> = HashMap::new();
    for comment in comments {
        let CommentRow {
            id,
            post_id,
            user_id,
            user_name,
            content,
            created_at,
        } = comment;

        let view = CommentView {
            content,
            user_id: user_id.parse().unwrap_or_else(|e| {
                warn!("Corrupt user_id '{}' on comment '{}': {}", user_id, id, e);
                Uuid::default()
            }),
            user_name,
            created_at: parse_ts(&created_at, "comment", &id),
        };
        comments_map.entry(post_id).or_default().push(view);
    }

    let authors_map: HashMap<String, AuthorRow> =
        authors.into_iter().map(|a| (a.id.clone(), a)).collect();

    let views = posts
        .into_iter()
        .map(|post| {
            let author = authors_map
                .get(&post.author_id)
                .map(|a| PostAuthor {
                    id: a.id.parse().ok(),
                    name: a.name.clone(),
                    photo_url: a.photo_url.clone(),
                    role: Some(a.role.clone()),
                    department: a.department.clone(),
                })
                .unwrap_or_else(|| PostAuthor {
                    id: None,
                    name: UNKNOWN_AUTHOR.to_string(),
                    photo_url: None,
                    role: None,
                    department: None,
                });

            PostView {
                id: post.id.parse().unwrap_or_else(|e| {
                    warn!("Corrupt post id '{}': {}", post.id, e);
                    Uuid::default()
                }),
                likes: likes_map.remove(&post.id).unwrap_or_default(),
                comments: comments_map.remove(&post.id).unwrap_or_default(),
                created_at: parse_ts(&post.created_at, "post", &post.id),
                content: post.content,
                image_url: post.image_url,
                author,
            }
        })
        .collect();

    Ok(views)
}

fn parse_ts(raw: &str, what: &str, id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt created_at '{}' on {} '{}': {}", raw, what, id, e);
        DateTime::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use swish_db::Database;

    use crate::AppStateInner;

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
            admin_code: "CAMPUS2024".into(),
            campus: "SIGCE Campus".into(),
            email_domains: vec!["sigce.edu".into()],
            photos: None,
        })
    }

    #[tokio::test]
    async fn missing_author_gets_placeholder() {
        let state = test_state();
        let ghost = Uuid::new_v4().to_string();
        let pid = Uuid::new_v4().to_string();
        state
            .db
            .insert_post(
                &pid,
                &ghost,
                "orphaned",
                None,
                "2026-08-05T10:00:00.000000Z",
                "2026-08-05T10:00:00.000000Z",
            )
            .unwrap();

        let rows = state.db.get_posts().unwrap();
        let views = enrich_all(&state, rows).await.unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].author.name, "Unknown User");
        assert_eq!(views[0].author.id, None);
        assert_eq!(views[0].content, "orphaned");
    }

    #[tokio::test]
    async fn empty_feed_is_fine() {
        let state = test_state();
        let views = enrich_all(&state, vec![]).await.unwrap();
        assert!(views.is_empty());
    }
}
