//! Repository for the `comment_moderation_log` table.

use quill_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::moderation_log::ModerationLogEntry;

const COLUMNS: &str = "id, comment_id, moderator_id, action, reason, created_at";

pub struct ModerationLogRepo;

impl ModerationLogRepo {
    /// Append an entry. Runs on the caller's transaction so it commits with
    /// the change it records.
    pub async fn create(
        conn: &mut PgConnection,
        comment_id: DbId,
        moderator_id: DbId,
        action: &str,
        reason: &str,
    ) -> Result<ModerationLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO comment_moderation_log (comment_id, moderator_id, action, reason)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModerationLogEntry>(&query)
            .bind(comment_id)
            .bind(moderator_id)
            .bind(action)
            .bind(reason)
            .fetch_one(conn)
            .await
    }

    /// List log entries, newest first, optionally for a single comment.
    pub async fn list(
        pool: &PgPool,
        comment_id: Option<DbId>,
    ) -> Result<Vec<ModerationLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comment_moderation_log
             WHERE ($1::BIGINT IS NULL OR comment_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ModerationLogEntry>(&query)
            .bind(comment_id)
            .fetch_all(pool)
            .await
    }
}
