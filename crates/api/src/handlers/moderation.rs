//! Moderator-only listings: comment queues, reports and the moderation log.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use quill_core::comments::ModerationFilter;
use quill_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::rbac::RequireModerator;
use crate::query::{ModerationListParams, ModerationLogParams, ReportListParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /admin/comments/?article=&status=
pub async fn list_comments(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<ModerationListParams>,
) -> AppResult<impl IntoResponse> {
    let comments = state
        .service
        .list_for_moderation(&auth.actor(), params.status, params.article)
        .await?;
    Ok(Json(DataResponse { data: comments }))
}

/// GET /admin/comments/pending/
///
/// Comments that are neither approved nor spam, newest first.
pub async fn list_pending(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let comments = state
        .service
        .list_for_moderation(&auth.actor(), ModerationFilter::Pending, None)
        .await?;
    Ok(Json(DataResponse { data: comments }))
}

/// GET /admin/comments/spam/
pub async fn list_spam(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let comments = state
        .service
        .list_for_moderation(&auth.actor(), ModerationFilter::Spam, None)
        .await?;
    Ok(Json(DataResponse { data: comments }))
}

/// GET /admin/reports/?unresolved=
pub async fn list_reports(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<ReportListParams>,
) -> AppResult<impl IntoResponse> {
    let reports = state
        .service
        .list_reports(&auth.actor(), params.unresolved)
        .await?;
    Ok(Json(DataResponse { data: reports }))
}

/// POST /admin/reports/{id}/resolve/
pub async fn resolve_report(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = state.service.resolve_report(&auth.actor(), id).await?;

    tracing::info!(
        user_id = auth.user_id,
        report_id = id,
        comment_id = report.comment_id,
        "Comment report resolved"
    );

    Ok(Json(DataResponse { data: report }))
}

/// GET /admin/log/?comment=
pub async fn list_log(
    RequireModerator(auth): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<ModerationLogParams>,
) -> AppResult<impl IntoResponse> {
    let entries = state
        .service
        .list_moderation_log(&auth.actor(), params.comment)
        .await?;
    Ok(Json(DataResponse { data: entries }))
}
