use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use super::repo;
use crate::{AppResult, session};

#[debug_handler]
pub(crate) async fn get_posts(State(db_pool): State<SqlitePool>) -> AppResult<Response> {
    Ok(Json(repo::all_posts(&db_pool).await?).into_response())
}

#[debug_handler]
pub(crate) async fn get_my_posts(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user_id) = session::current_user(&session).await? else {
        return Ok((StatusCode::UNAUTHORIZED, "Unauthorized. Please log in.").into_response());
    };
    Ok(Json(repo::posts_by_user(&db_pool, user_id).await?).into_response())
}

/// Posts in a named category. `Liked` is special: the session user's liked
/// posts rather than a stored category.
#[debug_handler]
pub(crate) async fn get_posts_by_category(
    Path(category): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if category == "Liked" {
        let Some(user_id) = session::current_user(&session).await? else {
            return Ok((StatusCode::UNAUTHORIZED, "Unauthorized. Please log in.").into_response());
        };
        return Ok(Json(repo::liked_posts(&db_pool, user_id).await?).into_response());
    }
    Ok(Json(repo::posts_by_category(&db_pool, &category).await?).into_response())
}
