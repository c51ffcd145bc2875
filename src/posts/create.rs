use axum::{
    Json, debug_handler,
    extract::State,
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
pub(crate) struct CreatePostRequest {
    title: String,
    content: String,
    #[serde(default)]
    categories: Vec<String>,
}

#[debug_handler]
pub(crate) async fn create_post(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok((StatusCode::UNAUTHORIZED, "Unauthorized. Please log in.").into_response());
    };

    if req.title.is_empty() || req.content.is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "Title and Content cannot be empty.").into_response());
    }

    let (post_id, created_at) = repo::insert_post(&db_pool, user_id, &req.title, &req.content).await?;

    // a post always belongs to at least one category
    let categories = if req.categories.is_empty() {
        vec!["none".to_owned()]
    } else {
        req.categories
    };
    for name in &categories {
        let category_id = repo::get_or_create_category(&db_pool, name).await?;
        repo::link_post_category(&db_pool, post_id, category_id).await?;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Post created successfully.",
        "postID": post_id,
        "createdAt": created_at,
    }))
    .into_response())
}
