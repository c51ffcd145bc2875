use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use forum::chat::{Hub, SqliteMessageSink};
use forum::{AppState, auth, chat, db, likes, posts, users};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

async fn test_app() -> Router {
    let db_pool = db::connect("sqlite::memory:").await.unwrap();
    db::create_tables(&db_pool).await.unwrap();

    let hub = Arc::new(Hub::new(Arc::new(SqliteMessageSink::new(db_pool.clone()))));
    let state = AppState { db_pool, hub };

    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(likes::router())
        .merge(users::router())
        .merge(chat::router())
        .with_state(state)
        .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn signup_payload(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "fname": "Test",
        "lname": "User",
        "email": email,
        "age": 30,
        "gender": "other",
        "password": "Str0ng!enough",
    })
}

/// Registers and logs in, returning the session cookie and user id.
async fn login(app: &Router, username: &str, email: &str) -> (String, i64) {
    let response = app
        .clone()
        .oneshot(json_post("/signup", signup_payload(username, email)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_post(
            "/login",
            json!({ "userOremail": username, "password": "Str0ng!enough" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let body = body_json(response).await;
    assert_eq!(body["message"], "Login successful.");
    (cookie, body["userID"].as_i64().unwrap())
}

#[tokio::test]
async fn signup_validation_rejects_bad_input() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_post("/signup", signup_payload("alice", "alice@example.com")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // duplicate username
    let response = app
        .clone()
        .oneshot(json_post("/signup", signup_payload("alice", "other@example.com")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Username already exists");

    // weak password
    let mut payload = signup_payload("bob", "bob@example.com");
    payload["password"] = json!("weak");
    let response = app.clone().oneshot(json_post("/signup", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_and_session_round_trip() {
    let app = test_app().await;
    let (cookie, user_id) = login(&app, "alice", "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/check-session", &cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["loggedIn"], true);
    assert_eq!(body["userID"].as_i64().unwrap(), user_id);

    // wrong password is refused
    let response = app
        .clone()
        .oneshot(json_post(
            "/login",
            json!({ "userOremail": "alice", "password": "Wrong!password1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // anonymous callers see an empty user list
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/get-users").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));

    // logged-in callers see everyone, offline without a chat connection
    let response = app
        .clone()
        .oneshot(get_with_cookie("/get-users", &cookie))
        .await
        .unwrap();
    let users = body_json(response).await;
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[0]["online"], false);
}

#[tokio::test]
async fn posts_comments_and_likes_flow() {
    let app = test_app().await;
    let (cookie, _) = login(&app, "alice", "alice@example.com").await;

    // creating a post requires a session
    let response = app
        .clone()
        .oneshot(json_post(
            "/create-post",
            json!({ "title": "Hello", "content": "World", "categories": ["general"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = json_post(
        "/create-post",
        json!({ "title": "Hello", "content": "World", "categories": ["general"] }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let post_id = body_json(response).await["postID"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/get-posts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let posts = body_json(response).await;
    assert_eq!(posts[0]["title"], "Hello");
    assert_eq!(posts[0]["categories"], json!(["general"]));

    let mut request = json_post(
        "/create-comment",
        json!({ "post_id": post_id, "content": "Nice post" }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/comments?post_id={post_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["post"]["id"].as_i64().unwrap(), post_id);
    assert_eq!(body["comments"][0]["content"], "Nice post");

    // like, then like again to remove (toggle)
    let mut request = json_post("/likeDislikePost", json!({ "post_id": post_id, "is_like": true }));
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["likes"].as_i64().unwrap(), 1);
    assert_eq!(body["dislikes"].as_i64().unwrap(), 0);

    let mut request = json_post("/likeDislikePost", json!({ "post_id": post_id, "is_like": true }));
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["likes"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn message_history_requires_session_and_pages() {
    let app = test_app().await;

    // anonymous history queries are refused
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/messages?with=2").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (cookie, _) = login(&app, "alice", "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/messages?with=0", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get_with_cookie("/messages?with=2", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}
