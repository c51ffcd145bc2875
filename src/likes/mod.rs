mod repo;

pub use repo::Target;

use axum::{
    Json, debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, AppState, session};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/likeDislikePost", post(like_dislike_post))
        .route("/likeDislikeComment", post(like_dislike_comment))
        .route("/getInteractions", post(get_interactions))
}

#[derive(Deserialize)]
pub(crate) struct InteractRequest {
    post_id: Option<i64>,
    comment_id: Option<i64>,
    #[serde(default)]
    is_like: bool,
}

impl InteractRequest {
    fn target(&self) -> Option<Target> {
        match (self.post_id, self.comment_id) {
            (Some(post_id), _) => Some(Target::Post(post_id)),
            (None, Some(comment_id)) => Some(Target::Comment(comment_id)),
            (None, None) => None,
        }
    }
}

#[debug_handler]
pub(crate) async fn like_dislike_post(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(req): Json<InteractRequest>,
) -> AppResult<Response> {
    let Some(post_id) = req.post_id else {
        return Ok((StatusCode::BAD_REQUEST, "Post ID is required").into_response());
    };
    toggle(&db_pool, &session, Target::Post(post_id), req.is_like).await
}

#[debug_handler]
pub(crate) async fn like_dislike_comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(req): Json<InteractRequest>,
) -> AppResult<Response> {
    let Some(comment_id) = req.comment_id else {
        return Ok((StatusCode::BAD_REQUEST, "Comment ID is required").into_response());
    };
    toggle(&db_pool, &session, Target::Comment(comment_id), req.is_like).await
}

/// Toggle semantics: no existing interaction inserts one, a repeat of the
/// same polarity removes it, the opposite polarity replaces it.
async fn toggle(
    db_pool: &SqlitePool,
    session: &Session,
    target: Target,
    is_like: bool,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(session).await? else {
        return Ok((StatusCode::UNAUTHORIZED, "Unauthorized. Please log in.").into_response());
    };

    match repo::interaction(db_pool, user_id, target).await? {
        None => repo::insert_interaction(db_pool, user_id, target, is_like).await?,
        Some(existing) if existing == is_like => {
            repo::remove_interaction(db_pool, user_id, target).await?;
        }
        Some(_) => {
            repo::remove_interaction(db_pool, user_id, target).await?;
            repo::insert_interaction(db_pool, user_id, target, is_like).await?;
        }
    }

    let (likes, dislikes) = repo::counts(db_pool, target).await?;
    Ok(Json(json!({
        "message": "Interaction updated successfully",
        "likes": likes,
        "dislikes": dislikes,
    }))
    .into_response())
}

#[debug_handler]
pub(crate) async fn get_interactions(
    State(db_pool): State<SqlitePool>,
    Json(req): Json<InteractRequest>,
) -> AppResult<Response> {
    let Some(target) = req.target() else {
        return Ok((StatusCode::BAD_REQUEST, "Post or comment ID is required").into_response());
    };

    let (likes, dislikes) = repo::counts(&db_pool, target).await?;
    Ok(Json(json!({ "likes": likes, "dislikes": dislikes })).into_response())
}
