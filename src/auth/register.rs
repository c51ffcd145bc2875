use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{
    Json, debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use super::StatusResponse;
use crate::AppResult;

#[derive(Deserialize)]
pub(crate) struct RegisterRequest {
    username: String,
    #[serde(default)]
    fname: String,
    #[serde(default)]
    lname: String,
    email: String,
    #[serde(default)]
    age: i64,
    #[serde(default)]
    gender: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let email = req.email.to_lowercase();

    if let Some(message) = validation_error(&db_pool, &req.username, &email, &req.password).await? {
        return Ok((StatusCode::BAD_REQUEST, Json(StatusResponse::failure(message))).into_response());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("password hashing failed: {err}"))?
        .to_string();

    sqlx::query(
        "INSERT INTO users (username, firstname, lastname, age, gender, email, password) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&req.username)
    .bind(&req.fname)
    .bind(&req.lname)
    .bind(req.age.to_string())
    .bind(&req.gender)
    .bind(&email)
    .bind(&password_hash)
    .execute(&db_pool)
    .await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "User registered successfully.".to_owned(),
    })
    .into_response())
}

async fn validation_error(
    db_pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<Option<&'static str>> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Ok(Some("You must fill all fields"));
    }
    if user_exists(db_pool, "username", username).await? {
        return Ok(Some("Username already exists"));
    }
    if !email_looks_valid(email) {
        return Ok(Some("Invalid email format"));
    }
    if user_exists(db_pool, "email", email).await? {
        return Ok(Some("Email already exists"));
    }
    if !password_is_strong(password) {
        return Ok(Some(
            "Invalid password format. Your password must be at least 10 characters long \
             and contain uppercase, lowercase, numbers, and special characters.",
        ));
    }
    Ok(None)
}

async fn user_exists(db_pool: &SqlitePool, column: &str, value: &str) -> AppResult<bool> {
    // column is one of two fixed names, never user input
    let query = format!("SELECT 1 FROM users WHERE {column} = ?");
    Ok(sqlx::query_as::<_, (i64,)>(&query)
        .bind(value)
        .fetch_optional(db_pool)
        .await?
        .is_some())
}

fn email_looks_valid(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn password_is_strong(password: &str) -> bool {
    password.len() >= 10
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}
