//! Comment report model and DTOs.

use quill_core::comments::ReportReason;
use quill_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `comment_reports` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CommentReport {
    pub id: DbId,
    pub comment_id: DbId,
    pub reporter_id: DbId,
    pub reason: String,
    pub description: String,
    pub is_resolved: bool,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Request body for `POST /comments/{id}/report/`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentReport {
    pub reason: ReportReason,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
}
