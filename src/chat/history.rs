use axum::{
    Json, debug_handler,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use super::store::{MessageSink, SqliteMessageSink};
use crate::{AppResult, session};

/// Fixed page size of the history surface.
pub(crate) const PAGE_SIZE: i64 = 10;

#[derive(Deserialize)]
pub(crate) struct HistoryQuery {
    with: i64,
    #[serde(default)]
    offset: i64,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn messages(
    Query(HistoryQuery { with, offset }): Query<HistoryQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };
    if with <= 0 {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }

    let sink = SqliteMessageSink::new(db_pool);
    let messages = sink.load_recent(user, with, PAGE_SIZE, offset).await?;
    Ok(Json(messages).into_response())
}
