//! Handlers for the public comment endpoints.
//!
//! Reading is open to anonymous callers. Writing requires a bearer token;
//! approve and mark-spam additionally require a moderator role.

use std::future::Future;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use quill_core::comments::CommentOrdering;
use quill_core::types::DbId;
use quill_db::models::comment::{CreateComment, UpdateComment};
use quill_db::models::report::CreateCommentReport;
use quill_db::StoreResult;

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::middleware::rbac::{RequireAuth, RequireModerator};
use crate::query::CommentListParams;
use crate::rate_limit::RateLimitedAction;
use crate::response::{DataResponse, DeletedResponse};
use crate::state::AppState;

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

/// Run `write` under the per-user limit unless the caller moderates. A
/// write the service rejects gives its slot back.
async fn rate_limited<T>(
    state: &AppState,
    auth: &AuthUser,
    action: RateLimitedAction,
    write: impl Future<Output = StoreResult<T>>,
) -> AppResult<T> {
    if auth.actor().is_moderator() {
        return Ok(write.await?);
    }
    state.rate_limiter.check(auth.user_id, action).await?;
    let result = write.await;
    if result.is_err() {
        state.rate_limiter.release(auth.user_id, action).await;
    }
    Ok(result?)
}

/* --------------------------------------------------------------------------
Reading
-------------------------------------------------------------------------- */

/// GET /articles/{article_id}/comments/?ordering=&tree=
///
/// Public comments of an article. Flat by default; `tree=true` returns
/// `{count, threads}` with nested replies.
pub async fn list_article_comments(
    State(state): State<AppState>,
    Path(article_id): Path<DbId>,
    Query(params): Query<CommentListParams>,
) -> AppResult<Response> {
    let ordering = match params.ordering.as_deref() {
        Some(raw) => CommentOrdering::parse(raw)?,
        None => CommentOrdering::default(),
    };

    if params.tree {
        let thread = state.service.thread(article_id, ordering).await?;
        return Ok(Json(DataResponse { data: thread }).into_response());
    }

    let comments = state.service.list_comments(article_id, ordering).await?;
    Ok(Json(DataResponse { data: comments }).into_response())
}

/// GET /articles/{article_id}/likes/
///
/// IDs of the article's comments the caller has liked.
pub async fn list_liked_comments(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Path(article_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ids = state
        .service
        .liked_comment_ids(&auth.actor(), article_id)
        .await?;
    Ok(Json(DataResponse { data: ids }))
}

/// GET /comments/{id}/
pub async fn get_comment(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comment = state.service.get_comment(viewer.actor().as_ref(), id).await?;
    Ok(Json(DataResponse { data: comment }))
}

/* --------------------------------------------------------------------------
Authoring
-------------------------------------------------------------------------- */

/// POST /comments/
///
/// Create a top-level comment or a reply (`parent` set).
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let actor = auth.actor();
    let comment = rate_limited(
        &state,
        &auth,
        RateLimitedAction::CreateComment,
        state.service.create_comment(&actor, &input),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        article_id = comment.article_id,
        comment_id = comment.id,
        parent_id = ?comment.parent_id,
        approved = comment.is_approved,
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// PATCH /comments/{id}/
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComment>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .service
        .update_comment(&auth.actor(), id, &input)
        .await?;

    tracing::info!(user_id = auth.user_id, comment_id = id, "Comment updated");

    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /comments/{id}/
///
/// Removes the comment together with every reply beneath it.
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = state.service.delete_comment(&auth.actor(), id).await?;

    tracing::info!(
        user_id = auth.user_id,
        comment_id = id,
        deleted,
        "Comment deleted"
    );

    Ok(Json(DataResponse {
        data: DeletedResponse { deleted },
    }))
}

/* --------------------------------------------------------------------------
Reactions
-------------------------------------------------------------------------- */

/// POST /comments/{id}/like/
pub async fn like_comment(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let status = state.service.like_comment(&auth.actor(), id).await?;

    tracing::info!(
        user_id = auth.user_id,
        comment_id = id,
        like_count = status.like_count,
        "Comment liked"
    );

    Ok(Json(DataResponse { data: status }))
}

/// POST|DELETE /comments/{id}/unlike/
pub async fn unlike_comment(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let status = state.service.unlike_comment(&auth.actor(), id).await?;

    tracing::info!(
        user_id = auth.user_id,
        comment_id = id,
        like_count = status.like_count,
        "Comment unliked"
    );

    Ok(Json(DataResponse { data: status }))
}

/// POST /comments/{id}/report/
pub async fn report_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateCommentReport>,
) -> AppResult<impl IntoResponse> {
    let actor = auth.actor();
    let report = rate_limited(
        &state,
        &auth,
        RateLimitedAction::ReportComment,
        state.service.report_comment(&actor, id, &input),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        comment_id = id,
        report_id = report.id,
        reason = %report.reason,
        "Comment reported"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/* --------------------------------------------------------------------------
Moderation transitions
-------------------------------------------------------------------------- */

/// POST /comments/{id}/approve/
pub async fn approve_comment(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comment = state.service.approve_comment(&auth.actor(), id).await?;

    tracing::info!(user_id = auth.user_id, comment_id = id, "Comment approved");

    Ok(Json(DataResponse { data: comment }))
}

/// POST /comments/{id}/mark_spam/
pub async fn mark_comment_as_spam(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .service
        .mark_comment_as_spam(&auth.actor(), id)
        .await?;

    tracing::info!(user_id = auth.user_id, comment_id = id, "Comment marked as spam");

    Ok(Json(DataResponse { data: comment }))
}
