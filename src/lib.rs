pub mod appresult;
pub mod auth;
pub mod chat;
pub mod db;
pub mod likes;
pub mod posts;
pub mod session;
pub mod users;

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};

use crate::chat::Hub;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub hub: Arc<Hub>,
}
