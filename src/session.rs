use tower_sessions::Session;

use crate::AppResult;

pub const USER_ID: &str = "user_id";

/// The authenticated user behind a request, if any. The session is the only
/// identity source the rest of the app trusts.
pub async fn current_user(session: &Session) -> AppResult<Option<i64>> {
    Ok(session.get::<i64>(USER_ID).await?)
}
