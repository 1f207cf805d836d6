//! Route definitions for comments, reactions and moderation.
//!
//! Paths keep their trailing slash; clients call them exactly as listed.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{comments, moderation};
use crate::state::AppState;

/// Comment routes, nested under `/comments`.
///
/// ```text
/// GET    /articles/{article_id}/comments/     list_article_comments
/// GET    /articles/{article_id}/likes/        list_liked_comments
/// POST   /comments/                           create_comment
/// GET    /comments/{id}/                      get_comment
/// PATCH  /comments/{id}/                      update_comment
/// DELETE /comments/{id}/                      delete_comment
/// POST   /comments/{id}/like/                 like_comment
/// POST   /comments/{id}/unlike/               unlike_comment
/// DELETE /comments/{id}/unlike/               unlike_comment
/// POST   /comments/{id}/report/               report_comment
/// POST   /comments/{id}/approve/              approve_comment
/// POST   /comments/{id}/mark_spam/            mark_comment_as_spam
///
/// GET    /admin/comments/                     moderation::list_comments
/// GET    /admin/comments/pending/             moderation::list_pending
/// GET    /admin/comments/spam/                moderation::list_spam
/// GET    /admin/reports/                      moderation::list_reports
/// POST   /admin/reports/{id}/resolve/         moderation::resolve_report
/// GET    /admin/log/                          moderation::list_log
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/articles/{article_id}/comments/",
            get(comments::list_article_comments),
        )
        .route(
            "/articles/{article_id}/likes/",
            get(comments::list_liked_comments),
        )
        .route("/comments/", post(comments::create_comment))
        .route(
            "/comments/{id}/",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route("/comments/{id}/like/", post(comments::like_comment))
        .route(
            "/comments/{id}/unlike/",
            post(comments::unlike_comment).delete(comments::unlike_comment),
        )
        .route("/comments/{id}/report/", post(comments::report_comment))
        .route("/comments/{id}/approve/", post(comments::approve_comment))
        .route(
            "/comments/{id}/mark_spam/",
            post(comments::mark_comment_as_spam),
        )
        .route("/admin/comments/", get(moderation::list_comments))
        .route("/admin/comments/pending/", get(moderation::list_pending))
        .route("/admin/comments/spam/", get(moderation::list_spam))
        .route("/admin/reports/", get(moderation::list_reports))
        .route(
            "/admin/reports/{id}/resolve/",
            post(moderation::resolve_report),
        )
        .route("/admin/log/", get(moderation::list_log))
}
