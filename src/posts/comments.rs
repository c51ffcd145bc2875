use axum::{
    Json, debug_handler,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use super::repo;
use crate::{AppResult, session};

#[derive(Deserialize)]
pub(crate) struct CommentsQuery {
    #[serde(default)]
    post_id: i64,
}

/// The post and its comments in one response.
#[debug_handler]
pub(crate) async fn get_comments(
    Query(CommentsQuery { post_id }): Query<CommentsQuery>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Response> {
    if post_id <= 0 {
        return Ok((StatusCode::BAD_REQUEST, "Invalid post ID").into_response());
    }

    let Some(post) = repo::post_by_id(&db_pool, post_id).await? else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let comments = repo::comments_for_post(&db_pool, post_id).await?;

    Ok(Json(json!({
        "post": post,
        "comments": comments,
    }))
    .into_response())
}

#[derive(Deserialize)]
pub(crate) struct CreateCommentRequest {
    #[serde(default)]
    post_id: i64,
    #[serde(default)]
    content: String,
}

#[debug_handler]
pub(crate) async fn create_comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok((StatusCode::UNAUTHORIZED, "Unauthorized. Please log in.").into_response());
    };

    if req.content.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "Comment content cannot be empty.").into_response());
    }
    if req.post_id <= 0 {
        return Ok((StatusCode::BAD_REQUEST, "Invalid post ID").into_response());
    }

    repo::insert_comment(&db_pool, req.post_id, user_id, &req.content).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment added successfully.",
    }))
    .into_response())
}
