//! Repository for the `comment_likes` table.
//!
//! Like/unlike run inside the caller's transaction so the like row and the
//! counter on `comments` move together.

use quill_core::types::DbId;
use sqlx::{PgConnection, PgPool};

pub struct CommentLikeRepo;

impl CommentLikeRepo {
    /// Insert a like. Returns `true` if a row was created, `false` if the
    /// user had already liked the comment.
    pub async fn insert(
        conn: &mut PgConnection,
        comment_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO comment_likes (comment_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (comment_id, user_id) DO NOTHING",
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Remove a like. Returns `true` if a row was deleted.
    pub async fn delete(
        conn: &mut PgConnection,
        comment_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// IDs of comments on `article_id` that `user_id` has liked.
    pub async fn liked_ids_for_article(
        pool: &PgPool,
        user_id: DbId,
        article_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT l.comment_id FROM comment_likes l
             INNER JOIN comments c ON c.id = l.comment_id
             WHERE l.user_id = $1 AND c.article_id = $2
             ORDER BY l.comment_id",
        )
        .bind(user_id)
        .bind(article_id)
        .fetch_all(pool)
        .await
    }
}
