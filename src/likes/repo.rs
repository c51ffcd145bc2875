use sqlx::SqlitePool;

use crate::AppResult;

/// What an interaction points at; exactly one of post or comment, matching
/// the table's CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Post(i64),
    Comment(i64),
}

impl Target {
    fn column(self) -> &'static str {
        match self {
            Target::Post(_) => "post_id",
            Target::Comment(_) => "comment_id",
        }
    }

    fn id(self) -> i64 {
        match self {
            Target::Post(id) | Target::Comment(id) => id,
        }
    }
}

/// The user's current interaction polarity with the target, if any.
pub async fn interaction(
    db_pool: &SqlitePool,
    user_id: i64,
    target: Target,
) -> AppResult<Option<bool>> {
    let query = format!(
        "SELECT is_like FROM likes WHERE user_id = ? AND {} = ?",
        target.column()
    );
    let row: Option<(bool,)> = sqlx::query_as(&query)
        .bind(user_id)
        .bind(target.id())
        .fetch_optional(db_pool)
        .await?;
    Ok(row.map(|(is_like,)| is_like))
}

pub async fn insert_interaction(
    db_pool: &SqlitePool,
    user_id: i64,
    target: Target,
    is_like: bool,
) -> AppResult<()> {
    let (post_id, comment_id) = match target {
        Target::Post(id) => (Some(id), None),
        Target::Comment(id) => (None, Some(id)),
    };
    sqlx::query("INSERT INTO likes (user_id, post_id, comment_id, is_like) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(post_id)
        .bind(comment_id)
        .bind(is_like)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn remove_interaction(
    db_pool: &SqlitePool,
    user_id: i64,
    target: Target,
) -> AppResult<()> {
    let query = format!(
        "DELETE FROM likes WHERE user_id = ? AND {} = ?",
        target.column()
    );
    sqlx::query(&query)
        .bind(user_id)
        .bind(target.id())
        .execute(db_pool)
        .await?;
    Ok(())
}

/// Like and dislike totals for the target.
pub async fn counts(db_pool: &SqlitePool, target: Target) -> AppResult<(i64, i64)> {
    let query = format!(
        "SELECT \
            COUNT(CASE WHEN is_like = 1 THEN 1 END), \
            COUNT(CASE WHEN is_like = 0 THEN 1 END) \
         FROM likes WHERE {} = ?",
        target.column()
    );
    let (likes, dislikes): (i64, i64) = sqlx::query_as(&query)
        .bind(target.id())
        .fetch_one(db_pool)
        .await?;
    Ok((likes, dislikes))
}
