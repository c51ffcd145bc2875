use serde::Serialize;
use sqlx::SqlitePool;

use crate::AppResult;

#[derive(Debug, Serialize)]
pub struct Post {
    pub id: i64,
    pub username: String,
    pub title: String,
    pub content: String,
    pub categories: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: String,
}

type PostRow = (i64, String, String, String, String);

async fn collect_posts(db_pool: &SqlitePool, rows: Vec<PostRow>) -> AppResult<Vec<Post>> {
    let mut posts = Vec::with_capacity(rows.len());
    for (id, username, title, content, created_at) in rows {
        posts.push(Post {
            id,
            username,
            title,
            content,
            categories: categories_for_post(db_pool, id).await?,
            created_at,
        });
    }
    Ok(posts)
}

pub async fn all_posts(db_pool: &SqlitePool) -> AppResult<Vec<Post>> {
    let rows: Vec<PostRow> = sqlx::query_as(
        "SELECT posts.id, users.username, posts.title, posts.content, posts.created_at \
         FROM posts JOIN users ON posts.user_id = users.id \
         ORDER BY posts.created_at DESC",
    )
    .fetch_all(db_pool)
    .await?;
    collect_posts(db_pool, rows).await
}

pub async fn posts_by_user(db_pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Post>> {
    let rows: Vec<PostRow> = sqlx::query_as(
        "SELECT p.id, u.username, p.title, p.content, p.created_at \
         FROM posts p JOIN users u ON p.user_id = u.id \
         WHERE u.id = ? ORDER BY p.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;
    collect_posts(db_pool, rows).await
}

pub async fn posts_by_category(db_pool: &SqlitePool, category: &str) -> AppResult<Vec<Post>> {
    let rows: Vec<PostRow> = sqlx::query_as(
        "SELECT p.id, u.username, p.title, p.content, p.created_at \
         FROM posts p \
         JOIN post_categories pc ON pc.post_id = p.id \
         JOIN categories c ON c.id = pc.category_id \
         JOIN users u ON u.id = p.user_id \
         WHERE c.name = ?",
    )
    .bind(category)
    .fetch_all(db_pool)
    .await?;
    collect_posts(db_pool, rows).await
}

pub async fn liked_posts(db_pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Post>> {
    let rows: Vec<PostRow> = sqlx::query_as(
        "SELECT p.id, u.username, p.title, p.content, p.created_at \
         FROM posts p \
         JOIN users u ON u.id = p.user_id \
         JOIN likes l ON l.post_id = p.id AND l.is_like = 1 \
         WHERE l.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;
    collect_posts(db_pool, rows).await
}

pub async fn post_by_id(db_pool: &SqlitePool, post_id: i64) -> AppResult<Option<Post>> {
    let row: Option<PostRow> = sqlx::query_as(
        "SELECT p.id, u.username, p.title, p.content, p.created_at \
         FROM posts p JOIN users u ON p.user_id = u.id \
         WHERE p.id = ?",
    )
    .bind(post_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(collect_posts(db_pool, row.into_iter().collect()).await?.pop())
}

pub async fn categories_for_post(db_pool: &SqlitePool, post_id: i64) -> AppResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT categories.name FROM categories \
         JOIN post_categories ON categories.id = post_categories.category_id \
         WHERE post_categories.post_id = ?",
    )
    .bind(post_id)
    .fetch_all(db_pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Inserts the post and returns its id and creation timestamp.
pub async fn insert_post(
    db_pool: &SqlitePool,
    user_id: i64,
    title: &str,
    content: &str,
) -> AppResult<(i64, String)> {
    let result = sqlx::query("INSERT INTO posts (user_id, title, content) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(title)
        .bind(content)
        .execute(db_pool)
        .await?;
    let post_id = result.last_insert_rowid();

    let (created_at,): (String,) = sqlx::query_as("SELECT created_at FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_one(db_pool)
        .await?;
    Ok((post_id, created_at))
}

/// Categories are created on first use.
pub async fn get_or_create_category(db_pool: &SqlitePool, name: &str) -> AppResult<i64> {
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM categories WHERE name = ?")
        .bind(name)
        .fetch_optional(db_pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(name)
        .execute(db_pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn link_post_category(
    db_pool: &SqlitePool,
    post_id: i64,
    category_id: i64,
) -> AppResult<()> {
    sqlx::query("INSERT INTO post_categories (post_id, category_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(category_id)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn insert_comment(
    db_pool: &SqlitePool,
    post_id: i64,
    user_id: i64,
    content: &str,
) -> AppResult<i64> {
    let result = sqlx::query("INSERT INTO comments (post_id, user_id, content) VALUES (?, ?, ?)")
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .execute(db_pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn comments_for_post(db_pool: &SqlitePool, post_id: i64) -> AppResult<Vec<Comment>> {
    let rows: Vec<(i64, i64, String, String, String)> = sqlx::query_as(
        "SELECT c.id, c.user_id, u.username, c.content, c.created_at \
         FROM comments c JOIN users u ON c.user_id = u.id \
         WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id ASC",
    )
    .bind(post_id)
    .fetch_all(db_pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, user_id, username, content, created_at)| Comment {
            id,
            user_id,
            username,
            content,
            created_at,
        })
        .collect())
}
