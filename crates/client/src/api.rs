//! REST access to the comments API.
//!
//! [`CommentApi`] is the seam the presenter talks to; [`HttpCommentApi`] is
//! the reqwest implementation against `/api/v1/comments`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use quill_core::comments::CommentOrdering;
use quill_core::types::DbId;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use crate::model::{Comment, Deleted, LikeStatus, NewComment, NewReport};

/// HTTP request timeout for a single call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Comment operations as seen from the client.
#[async_trait]
pub trait CommentApi: Send + Sync {
    /// Whether calls carry credentials. Anonymous callers can only read.
    fn is_authenticated(&self) -> bool;

    async fn list_comments(
        &self,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> ClientResult<Vec<Comment>>;

    async fn liked_comment_ids(&self, article_id: DbId) -> ClientResult<Vec<DbId>>;

    async fn create_comment(&self, input: &NewComment) -> ClientResult<Comment>;

    async fn update_comment(&self, id: DbId, content: &str) -> ClientResult<Comment>;

    /// Returns the number of comments removed, replies included.
    async fn delete_comment(&self, id: DbId) -> ClientResult<u64>;

    async fn like_comment(&self, id: DbId) -> ClientResult<LikeStatus>;

    async fn unlike_comment(&self, id: DbId) -> ClientResult<LikeStatus>;

    async fn report_comment(&self, id: DbId, report: &NewReport) -> ClientResult<()>;

    async fn approve_comment(&self, id: DbId) -> ClientResult<Comment>;

    async fn mark_comment_as_spam(&self, id: DbId) -> ClientResult<Comment>;
}

/* --------------------------------------------------------------------------
   HTTP implementation
   -------------------------------------------------------------------------- */

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    fields: BTreeMap<String, Vec<String>>,
}

/// [`CommentApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCommentApi {
    http: reqwest::Client,
    /// Server origin, e.g. `http://localhost:3000`.
    base_url: String,
    token: Option<String>,
}

impl HttpCommentApi {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to every subsequent call.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/api/v1/comments{path}", self.base_url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send, then decode `{data: T}` or turn the error body into
    /// [`ClientError::Api`].
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (message, fields) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.error, body.fields),
                Err(_) => (text, BTreeMap::new()),
            };
            tracing::debug!(status = status.as_u16(), %message, "Comment API call failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
                fields,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl CommentApi for HttpCommentApi {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn list_comments(
        &self,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> ClientResult<Vec<Comment>> {
        let request = self
            .request(Method::GET, &format!("/articles/{article_id}/comments/"))
            .query(&[("ordering", ordering.as_str())]);
        self.send(request).await
    }

    async fn liked_comment_ids(&self, article_id: DbId) -> ClientResult<Vec<DbId>> {
        let request = self.request(Method::GET, &format!("/articles/{article_id}/likes/"));
        self.send(request).await
    }

    async fn create_comment(&self, input: &NewComment) -> ClientResult<Comment> {
        let request = self.request(Method::POST, "/comments/").json(input);
        self.send(request).await
    }

    async fn update_comment(&self, id: DbId, content: &str) -> ClientResult<Comment> {
        let request = self
            .request(Method::PATCH, &format!("/comments/{id}/"))
            .json(&serde_json::json!({ "content": content }));
        self.send(request).await
    }

    async fn delete_comment(&self, id: DbId) -> ClientResult<u64> {
        let request = self.request(Method::DELETE, &format!("/comments/{id}/"));
        let deleted: Deleted = self.send(request).await?;
        Ok(deleted.deleted)
    }

    async fn like_comment(&self, id: DbId) -> ClientResult<LikeStatus> {
        let request = self.request(Method::POST, &format!("/comments/{id}/like/"));
        self.send(request).await
    }

    async fn unlike_comment(&self, id: DbId) -> ClientResult<LikeStatus> {
        let request = self.request(Method::POST, &format!("/comments/{id}/unlike/"));
        self.send(request).await
    }

    async fn report_comment(&self, id: DbId, report: &NewReport) -> ClientResult<()> {
        let request = self
            .request(Method::POST, &format!("/comments/{id}/report/"))
            .json(report);
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    async fn approve_comment(&self, id: DbId) -> ClientResult<Comment> {
        let request = self.request(Method::POST, &format!("/comments/{id}/approve/"));
        self.send(request).await
    }

    async fn mark_comment_as_spam(&self, id: DbId) -> ClientResult<Comment> {
        let request = self.request(Method::POST, &format!("/comments/{id}/mark_spam/"));
        self.send(request).await
    }
}
