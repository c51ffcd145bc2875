//! The chat relay: a process-wide hub routing direct messages, typing
//! signals, and forum notifications between connected WebSocket users, with
//! direct messages logged durably for the history endpoint.

mod history;
mod hub;
mod message;
mod store;
mod ws;

pub use hub::{Hub, OUTBOUND_CAPACITY};
pub use message::{ChatMessage, MessageKind, conversation_key};
pub use store::{MessageSink, SqliteMessageSink};

use axum::{Router, routing::get};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::chat_ws))
        .route("/messages", get(history::messages))
}
