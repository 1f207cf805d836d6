//! Shared helpers for the API integration tests.
//!
//! The app is built on [`MemoryCommentStore`], so no database is needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use quill_api::auth::jwt::{issue_token, JwtConfig};
use quill_api::config::ServerConfig;
use quill_api::router::build_app_router;
use quill_api::state::AppState;
use quill_core::comments::{ARTICLE_STATUS_DRAFT, ARTICLE_STATUS_PUBLISHED};
use quill_core::types::DbId;
use quill_db::models::article::CreateArticle;
use quill_db::{CommentPolicy, CommentService, MemoryCommentStore};

pub const JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        comments: CommentPolicy::default(),
        rate_limit_per_min: 0,
    }
}

/// A running app plus the store behind it, for seeding.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCommentStore>,
    /// A published article open for comments.
    pub article_id: DbId,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn add_article(&self, status: &str, allow_comments: bool) -> DbId {
        self.store
            .insert_article(CreateArticle {
                title: format!("{status} article"),
                status: status.to_string(),
                allow_comments,
            })
            .await
            .id
    }

    pub async fn add_draft(&self) -> DbId {
        self.add_article(ARTICLE_STATUS_DRAFT, true).await
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over a fresh in-memory store.
pub async fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryCommentStore::new());
    let article = store
        .insert_article(CreateArticle {
            title: "Published".into(),
            status: ARTICLE_STATUS_PUBLISHED.into(),
            allow_comments: true,
        })
        .await;

    let service = CommentService::new(store.clone(), config.comments);
    let state = AppState::new(service, config.clone());
    TestApp {
        router: build_app_router(state, &config),
        store,
        article_id: article.id,
    }
}

pub async fn build_test_app() -> TestApp {
    build_test_app_with(test_config()).await
}

/// Build an app where new comments are approved immediately.
pub async fn build_open_app() -> TestApp {
    let mut config = test_config();
    config.comments.require_approval = false;
    build_test_app_with(config).await
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn token(user_id: DbId, role: &str) -> String {
    issue_token(user_id, role, &test_config().jwt).unwrap()
}

pub fn reader_token(user_id: DbId) -> String {
    token(user_id, "reader")
}

pub fn admin_token() -> String {
    token(1, "admin")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST a comment and return its `data` object.
pub async fn create_comment(
    app: &TestApp,
    token: &str,
    parent: Option<DbId>,
    content: &str,
) -> serde_json::Value {
    let body = serde_json::json!({
        "article": app.article_id,
        "parent": parent,
        "content": content,
    });
    let response = post_json_auth(app.router(), "/api/v1/comments/comments/", body, token).await;
    assert_eq!(response.status(), 201, "comment creation should succeed");
    body_json(response).await["data"].clone()
}
