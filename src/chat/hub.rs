use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{RwLock, mpsc};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::message::{ChatMessage, MessageKind, conversation_key};
use super::store::MessageSink;

/// Capacity of each endpoint's outbound queue. Enqueueing is non-blocking;
/// a full queue drops the frame instead of stalling the hub, so one stalled
/// reader cannot hold up delivery to everyone else.
pub const OUTBOUND_CAPACITY: usize = 64;

struct Endpoint {
    conn: Uuid,
    queue: mpsc::Sender<ChatMessage>,
}

/// Process-wide registry of connected chat users and the single routing
/// authority. Endpoints never touch each other's state; the hub's only write
/// access to an endpoint is its queue.
pub struct Hub {
    connected: RwLock<HashMap<i64, Endpoint>>,
    conversations: RwLock<HashMap<(i64, i64), Vec<ChatMessage>>>,
    sink: Arc<dyn MessageSink>,
    echo_to_sender: bool,
}

impl Hub {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Hub {
            connected: RwLock::new(HashMap::new()),
            conversations: RwLock::new(HashMap::new()),
            sink,
            // the frontend relies on seeing its own notifications
            echo_to_sender: true,
        }
    }

    /// Whether notification fan-out includes the sender's own endpoint.
    pub fn echo_to_sender(mut self, echo: bool) -> Self {
        self.echo_to_sender = echo;
        self
    }

    /// Registers `user`'s endpoint. A second connection for the same user
    /// wins: the previous entry is replaced and its queue handle dropped,
    /// which ends the stale connection's outbound loop.
    pub async fn admit(&self, user: i64, conn: Uuid, queue: mpsc::Sender<ChatMessage>) {
        let prev = self
            .connected
            .write()
            .await
            .insert(user, Endpoint { conn, queue });
        if prev.is_some() {
            info!(user, "replacing existing chat connection");
        }
    }

    /// Removes `user`'s endpoint if it is still the one identified by
    /// `conn`. Idempotent; a replaced connection tearing down late cannot
    /// evict its successor.
    pub async fn remove(&self, user: i64, conn: Uuid) {
        let mut connected = self.connected.write().await;
        if connected.get(&user).is_some_and(|ep| ep.conn == conn) {
            connected.remove(&user);
        }
    }

    /// Snapshot of currently connected user ids. Stale the moment it
    /// returns; callers only use it to annotate listings.
    pub async fn list_online(&self) -> Vec<i64> {
        self.connected.read().await.keys().copied().collect()
    }

    /// Central dispatch. Never fails observably to the sender: routing
    /// misses are defined outcomes and persistence errors are swallowed
    /// after logging.
    pub async fn route(&self, mut msg: ChatMessage) {
        match msg.kind {
            MessageKind::Typing => {
                self.deliver(msg.to, msg).await;
            }
            MessageKind::PostCreated
            | MessageKind::CommentCreated
            | MessageKind::PostLiked
            | MessageKind::CommentLiked => {
                let connected = self.connected.read().await;
                for (user, endpoint) in connected.iter() {
                    if !self.echo_to_sender && *user == msg.from {
                        continue;
                    }
                    Self::enqueue(*user, endpoint, msg.clone());
                }
            }
            MessageKind::Direct => {
                msg.timestamp = Some(OffsetDateTime::now_utc());

                let key = conversation_key(msg.from, msg.to);
                self.conversations
                    .write()
                    .await
                    .entry(key)
                    .or_default()
                    .push(msg.clone());

                // persist-then-continue: the live path stays available even
                // when the log write fails, and there is no retry
                if let Err(err) = self.sink.append(&msg).await {
                    error!(from = msg.from, to = msg.to, %err, "failed to persist direct message");
                }

                self.deliver(msg.to, msg).await;
            }
        }
    }

    async fn deliver(&self, to: i64, msg: ChatMessage) {
        let connected = self.connected.read().await;
        if let Some(endpoint) = connected.get(&to) {
            Self::enqueue(to, endpoint, msg);
        }
    }

    fn enqueue(user: i64, endpoint: &Endpoint, msg: ChatMessage) {
        if let Err(err) = endpoint.queue.try_send(msg) {
            warn!(user, %err, "dropping chat frame: outbound queue unavailable");
        }
    }
}
