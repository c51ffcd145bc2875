use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One chat frame, inbound and outbound. Mirrors what the frontend sends:
/// plain messages, typing signals, and the post/comment/like notifications
/// it fires after mutating the forum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub from: i64,
    #[serde(default)]
    pub to: i64,
    #[serde(default)]
    pub content: String,
    /// Server-assigned for direct messages when the hub accepts them; never
    /// trusted from the client.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<i64>,
}

impl ChatMessage {
    pub fn direct(from: i64, to: i64, content: impl Into<String>) -> Self {
        ChatMessage {
            from,
            to,
            content: content.into(),
            timestamp: None,
            kind: MessageKind::Direct,
            post_id: None,
            comment_id: None,
        }
    }
}

/// Closed set of frame kinds. An absent or unrecognized `type` tag is a
/// plain direct message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MessageKind {
    #[serde(rename = "typing")]
    Typing,
    #[serde(rename = "new_post")]
    PostCreated,
    #[serde(rename = "new_comment")]
    CommentCreated,
    #[serde(rename = "new_postLike")]
    PostLiked,
    #[serde(rename = "new_commentLike")]
    CommentLiked,
    #[default]
    #[serde(rename = "message")]
    Direct,
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "typing" => MessageKind::Typing,
            "new_post" => MessageKind::PostCreated,
            "new_comment" => MessageKind::CommentCreated,
            "new_postLike" => MessageKind::PostLiked,
            "new_commentLike" => MessageKind::CommentLiked,
            _ => MessageKind::Direct,
        })
    }
}

impl MessageKind {
    /// Kinds fanned out to every connected user.
    pub fn is_notification(self) -> bool {
        matches!(
            self,
            MessageKind::PostCreated
                | MessageKind::CommentCreated
                | MessageKind::PostLiked
                | MessageKind::CommentLiked
        )
    }
}

/// Order-independent key for a pair of users' history: the same two
/// participants always resolve to the same conversation, whoever sent.
pub fn conversation_key(a: i64, b: i64) -> (i64, i64) {
    if a < b { (a, b) } else { (b, a) }
}
