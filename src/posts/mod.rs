mod comments;
mod create;
mod list;
mod repo;

pub use repo::{Comment, Post};

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-posts", get(list::get_posts))
        .route("/get-myPosts", get(list::get_my_posts))
        .route("/create-post", post(create::create_post))
        .route("/category/{name}", get(list::get_posts_by_category))
        .route("/comments", get(comments::get_comments))
        .route("/create-comment", post(comments::create_comment))
}
