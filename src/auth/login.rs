use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use axum::{
    Json, debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use super::StatusResponse;
use crate::{AppResult, session};

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(rename = "userOremail")]
    user_or_email: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(LoginRequest { user_or_email, password }): Json<LoginRequest>,
) -> AppResult<Response> {
    if user_or_email.is_empty() || password.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::failure("You must fill all fields")),
        )
            .into_response());
    }

    let row: Option<(i64, String, String)> =
        sqlx::query_as("SELECT id, username, password FROM users WHERE username = ? OR email = ?")
            .bind(&user_or_email)
            .bind(user_or_email.to_lowercase())
            .fetch_optional(&db_pool)
            .await?;

    let Some((user_id, username, password_hash)) = row else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(StatusResponse::failure("Invalid username/email or password")),
        )
            .into_response());
    };

    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|err| anyhow::anyhow!("stored password hash is invalid: {err}"))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(StatusResponse::failure("Invalid username/email or password")),
        )
            .into_response());
    }

    session.insert(session::USER_ID, user_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful.",
        "username": username,
        "userID": user_id,
    }))
    .into_response())
}

#[debug_handler]
pub(crate) async fn check_session(session: Session) -> AppResult<Response> {
    let user_id = session::current_user(&session).await?;
    Ok(Json(json!({
        "loggedIn": user_id.is_some(),
        "userID": user_id.unwrap_or(0),
    }))
    .into_response())
}
