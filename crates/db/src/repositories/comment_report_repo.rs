//! Repository for the `comment_reports` table.

use quill_core::types::DbId;
use sqlx::PgPool;

use crate::models::report::CommentReport;

const COLUMNS: &str = "id, comment_id, reporter_id, reason, description, \
    is_resolved, resolved_by, resolved_at, created_at";

pub struct CommentReportRepo;

impl CommentReportRepo {
    /// Insert a report. Fails with a unique violation on
    /// `uq_comment_reports_comment_reporter` if the user already reported
    /// this comment.
    pub async fn create(
        pool: &PgPool,
        comment_id: DbId,
        reporter_id: DbId,
        reason: &str,
        description: &str,
    ) -> Result<CommentReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO comment_reports (comment_id, reporter_id, reason, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommentReport>(&query)
            .bind(comment_id)
            .bind(reporter_id)
            .bind(reason)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// List reports, newest first.
    pub async fn list(
        pool: &PgPool,
        unresolved_only: bool,
    ) -> Result<Vec<CommentReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comment_reports
             WHERE NOT ($1 AND is_resolved)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, CommentReport>(&query)
            .bind(unresolved_only)
            .fetch_all(pool)
            .await
    }

    /// Mark a report resolved. Re-resolving keeps the original resolver.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        resolved_by: DbId,
    ) -> Result<Option<CommentReport>, sqlx::Error> {
        let query = format!(
            "UPDATE comment_reports SET
                resolved_by = CASE WHEN is_resolved THEN resolved_by ELSE $1 END,
                resolved_at = CASE WHEN is_resolved THEN resolved_at ELSE now() END,
                is_resolved = TRUE
             WHERE id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommentReport>(&query)
            .bind(resolved_by)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
