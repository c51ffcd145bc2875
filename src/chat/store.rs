use async_trait::async_trait;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use super::message::{ChatMessage, MessageKind};

/// Durable log of delivered direct messages. The hub appends fire-and-forget;
/// the history endpoint reads pages back newest-first.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn append(&self, msg: &ChatMessage) -> anyhow::Result<()>;

    async fn load_recent(
        &self,
        user_a: i64,
        user_b: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ChatMessage>>;
}

#[derive(Clone)]
pub struct SqliteMessageSink {
    pool: SqlitePool,
}

impl SqliteMessageSink {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteMessageSink { pool }
    }
}

#[async_trait]
impl MessageSink for SqliteMessageSink {
    async fn append(&self, msg: &ChatMessage) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO messages (sender_id, receiver_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(msg.from)
        .bind(msg.to)
        .bind(&msg.content)
        .bind(msg.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_recent(
        &self,
        user_a: i64,
        user_b: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ChatMessage>> {
        let rows: Vec<(i64, i64, String, OffsetDateTime)> = sqlx::query_as(
            "SELECT sender_id, receiver_id, content, created_at FROM messages \
             WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?) \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(from, to, content, timestamp)| ChatMessage {
                from,
                to,
                content,
                timestamp: Some(timestamp),
                kind: MessageKind::Direct,
                post_id: None,
                comment_id: None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::time::Duration;

    async fn test_sink() -> SqliteMessageSink {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        db::create_tables(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO users (id, username, firstname, lastname, age, gender, email, password) \
             VALUES (1, 'alice', 'Alice', 'A', '30', 'f', 'alice@example.com', 'x'), \
                    (2, 'bob', 'Bob', 'B', '30', 'm', 'bob@example.com', 'x'), \
                    (3, 'carol', 'Carol', 'C', '30', 'f', 'carol@example.com', 'x')",
        )
        .execute(&pool)
        .await
        .unwrap();
        SqliteMessageSink::new(pool)
    }

    fn stamped(from: i64, to: i64, content: &str) -> ChatMessage {
        let mut msg = ChatMessage::direct(from, to, content);
        msg.timestamp = Some(OffsetDateTime::now_utc());
        msg
    }

    #[tokio::test]
    async fn load_recent_is_symmetric_and_newest_first() {
        let sink = test_sink().await;
        for content in ["first", "second", "third"] {
            sink.append(&stamped(1, 2, content)).await.unwrap();
            // distinct timestamps so the ordering is unambiguous
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        sink.append(&stamped(2, 1, "reply")).await.unwrap();

        let forward = sink.load_recent(1, 2, 10, 0).await.unwrap();
        let backward = sink.load_recent(2, 1, 10, 0).await.unwrap();
        assert_eq!(forward.len(), 4);
        assert_eq!(forward[0].content, "reply");
        assert_eq!(forward[3].content, "first");

        let forward_contents: Vec<_> = forward.iter().map(|m| m.content.clone()).collect();
        let backward_contents: Vec<_> = backward.iter().map(|m| m.content.clone()).collect();
        assert_eq!(forward_contents, backward_contents);
    }

    #[tokio::test]
    async fn load_recent_pages() {
        let sink = test_sink().await;
        for i in 0..15 {
            sink.append(&stamped(1, 2, &format!("msg {i}"))).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let first_page = sink.load_recent(1, 2, 10, 0).await.unwrap();
        let second_page = sink.load_recent(1, 2, 10, 10).await.unwrap();
        assert_eq!(first_page.len(), 10);
        assert_eq!(second_page.len(), 5);
        assert_eq!(first_page[0].content, "msg 14");
        assert_eq!(second_page[4].content, "msg 0");
    }

    #[tokio::test]
    async fn other_conversations_stay_out() {
        let sink = test_sink().await;
        sink.append(&stamped(1, 2, "for two")).await.unwrap();
        sink.append(&stamped(1, 3, "for three")).await.unwrap();

        let msgs = sink.load_recent(1, 3, 10, 0).await.unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "for three");
        assert!(msgs[0].timestamp.is_some());
    }
}
