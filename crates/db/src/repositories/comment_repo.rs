//! Repository for the `comments` table.

use quill_core::comments::{CommentOrdering, ModerationFilter};
use quill_core::moderation::ModerationFlags;
use quill_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::comment::{Comment, ModerationComment, NewComment};

/// Column list for comments queries.
const COLUMNS: &str = "id, article_id, author_id, parent_id, content, \
    is_approved, is_spam, is_edited, edited_at, like_count, depth, \
    created_at, updated_at";

/// Same columns qualified with the `c` alias, for joins.
const C_COLUMNS: &str = "c.id, c.article_id, c.author_id, c.parent_id, c.content, \
    c.is_approved, c.is_spam, c.is_edited, c.edited_at, c.like_count, c.depth, \
    c.created_at, c.updated_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// List an article's approved, non-spam comments as a flat list in the
    /// requested order.
    pub async fn list_public(
        pool: &PgPool,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE article_id = $1 AND is_approved AND NOT is_spam
             ORDER BY {}",
            ordering.sql_order_by()
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(article_id)
            .fetch_all(pool)
            .await
    }

    /// Find a comment by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments
                (article_id, author_id, parent_id, content, depth, is_approved)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.article_id)
            .bind(input.author_id)
            .bind(input.parent_id)
            .bind(&input.content)
            .bind(input.depth)
            .bind(input.is_approved)
            .fetch_one(pool)
            .await
    }

    /// Replace a comment's content and mark it edited.
    pub async fn update_content(
        conn: &mut PgConnection,
        id: DbId,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET
                content = $1, is_edited = TRUE, edited_at = now(), updated_at = now()
             WHERE id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(content)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Persist moderation flags.
    pub async fn set_moderation(
        conn: &mut PgConnection,
        id: DbId,
        flags: ModerationFlags,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET is_approved = $1, is_spam = $2, updated_at = now()
             WHERE id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(flags.is_approved)
            .bind(flags.is_spam)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Delete a comment and every reply beneath it. Returns the number of
    /// rows removed (0 when the comment does not exist).
    pub async fn delete_subtree(conn: &mut PgConnection, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "WITH RECURSIVE subtree AS (
                 SELECT id FROM comments WHERE id = $1
                 UNION ALL
                 SELECT c.id FROM comments c
                 INNER JOIN subtree s ON c.parent_id = s.id
             )
             DELETE FROM comments WHERE id IN (SELECT id FROM subtree)",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Adjust the stored like counter by `delta`, never below zero.
    pub async fn adjust_like_count(
        conn: &mut PgConnection,
        id: DbId,
        delta: i32,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE comments SET like_count = GREATEST(like_count + $1, 0)
             WHERE id = $2
             RETURNING like_count",
        )
        .bind(delta)
        .bind(id)
        .fetch_one(conn)
        .await
    }

    /// Read the stored like counter.
    pub async fn like_count(conn: &mut PgConnection, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar("SELECT like_count FROM comments WHERE id = $1")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// List comments for moderators, newest first, with unresolved report
    /// counts and the article title.
    pub async fn list_for_moderation(
        pool: &PgPool,
        filter: ModerationFilter,
        article_id: Option<DbId>,
    ) -> Result<Vec<ModerationComment>, sqlx::Error> {
        let state_filter = match filter {
            ModerationFilter::Pending => "AND NOT c.is_approved AND NOT c.is_spam",
            ModerationFilter::Spam => "AND c.is_spam",
            ModerationFilter::All => "",
        };
        let query = format!(
            "SELECT {C_COLUMNS}, a.title AS article_title,
                    (SELECT COUNT(*) FROM comment_reports r
                     WHERE r.comment_id = c.id AND NOT r.is_resolved) AS report_count
             FROM comments c
             INNER JOIN articles a ON a.id = c.article_id
             WHERE ($1::BIGINT IS NULL OR c.article_id = $1) {state_filter}
             ORDER BY c.created_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, ModerationComment>(&query)
            .bind(article_id)
            .fetch_all(pool)
            .await
    }
}
