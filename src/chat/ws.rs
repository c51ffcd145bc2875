use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use super::hub::{Hub, OUTBOUND_CAPACITY};
use super::message::ChatMessage;
use crate::{AppResult, session};

#[derive(Deserialize)]
pub(crate) struct WsQuery {
    user_id: i64,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn chat_ws(
    Query(WsQuery { user_id }): Query<WsQuery>,
    State(hub): State<Arc<Hub>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    // The session is the authoritative identity; the query parameter only
    // names who the client claims to be and must agree with it.
    let Some(session_user) = session::current_user(&session).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };
    if user_id <= 0 || user_id != session_user {
        return Ok(StatusCode::FORBIDDEN.into_response());
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, user_id, hub)))
}

async fn handle_socket(socket: WebSocket, user_id: i64, hub: Arc<Hub>) {
    let conn = Uuid::now_v7();
    let (queue, mut outbound) = mpsc::channel::<ChatMessage>(OUTBOUND_CAPACITY);
    hub.admit(user_id, conn, queue).await;
    info!(user_id, %conn, "chat connection opened");

    let (mut sender, mut receiver) = socket.split();

    let write_task = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        if matches!(frame, Message::Close(_)) {
            break;
        }
        // undecodable frames are dropped, the connection stays open
        let Ok(msg) = serde_json::from_slice::<ChatMessage>(&frame.into_data()) else {
            continue;
        };
        hub.route(msg).await;
    }

    // teardown, exactly once per exit path: deregister (which closes our
    // queue sender and ends the write loop), then drop the socket halves
    hub.remove(user_id, conn).await;
    write_task.abort();
    info!(user_id, %conn, "chat connection closed");
}
