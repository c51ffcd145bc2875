use std::collections::HashSet;
use std::sync::Arc;

use axum::{Json, debug_handler, extract::State, response::{IntoResponse, Response}, routing::get, Router};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, AppState, chat::Hub, session};

pub fn router() -> Router<AppState> {
    Router::new().route("/get-users", get(get_users))
}

#[derive(Serialize)]
pub(crate) struct UserEntry {
    id: i64,
    username: String,
    online: bool,
}

/// Every user, annotated with whether they currently hold a chat
/// connection. The online set is a snapshot and may be stale by the time
/// the client renders it.
#[debug_handler(state = AppState)]
pub(crate) async fn get_users(
    State(db_pool): State<SqlitePool>,
    State(hub): State<Arc<Hub>>,
    session: Session,
) -> AppResult<Response> {
    if session::current_user(&session).await?.is_none() {
        return Ok(Json(Vec::<UserEntry>::new()).into_response());
    }

    let online: HashSet<i64> = hub.list_online().await.into_iter().collect();

    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, username FROM users")
        .fetch_all(&db_pool)
        .await?;

    let users: Vec<UserEntry> = rows
        .into_iter()
        .map(|(id, username)| UserEntry { id, username, online: online.contains(&id) })
        .collect();

    Ok(Json(users).into_response())
}
