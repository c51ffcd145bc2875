mod login;
mod logout;
mod register;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(register::register))
        .route("/login", post(login::login))
        .route("/logout", get(logout::logout))
        .route("/check-session", get(login::check_session))
}

#[derive(Serialize)]
pub(crate) struct StatusResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
}

impl StatusResponse {
    pub(crate) fn failure(message: &str) -> Self {
        StatusResponse { success: false, message: message.to_owned() }
    }
}
