use std::sync::Arc;

use axum::Router;
use forum::chat::{Hub, SqliteMessageSink};
use forum::{AppState, auth, chat, db, likes, posts, users};
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://forum.db?mode=rwc".to_owned());
    let db_pool = db::connect(&database_url).await?;
    db::create_tables(&db_pool).await?;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)));

    let hub = Arc::new(Hub::new(Arc::new(SqliteMessageSink::new(db_pool.clone()))));
    let app_state = AppState { db_pool, hub };

    let app = Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(likes::router())
        .merge(users::router())
        .merge(chat::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8888".to_owned());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
