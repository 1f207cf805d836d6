//! The comment persistence contract and its Postgres implementation.
//!
//! [`CommentStore`] only persists and queries. Rules
//! about who may do what, content limits and moderation transitions live
//! in [`crate::service::CommentService`], which works against any store.

use async_trait::async_trait;
use quill_core::comments::{
    deletion_reason, CommentOrdering, ModerationAction, ModerationFilter, ReportReason,
};
use quill_core::error::CoreError;
use quill_core::moderation::ModerationFlags;
use quill_core::types::DbId;

use crate::models::article::Article;
use crate::models::comment::{Comment, LikeStatus, ModerationComment, NewComment};
use crate::models::moderation_log::{ModerationLogEntry, ModerationNote};
use crate::models::report::CommentReport;
use crate::repositories::{
    ArticleRepo, CommentLikeRepo, CommentReportRepo, CommentRepo, ModerationLogRepo,
};
use crate::DbPool;

/// Error type returned by stores and the comment service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error (not found, validation, permission, conflict).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Build the `NotFound` error for a comment id.
pub fn comment_not_found(id: DbId) -> StoreError {
    StoreError::Core(CoreError::NotFound {
        entity: "Comment",
        id,
    })
}

/// Persistence operations for comments and their satellites.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Verify the backing storage is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    async fn find_article(&self, id: DbId) -> StoreResult<Option<Article>>;

    /// Approved, non-spam comments of an article.
    async fn list_public_comments(
        &self,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> StoreResult<Vec<Comment>>;

    async fn find_comment(&self, id: DbId) -> StoreResult<Option<Comment>>;

    async fn insert_comment(&self, input: &NewComment) -> StoreResult<Comment>;

    /// Replace content and set the edited flag and timestamp. `note` is
    /// logged in the same write.
    async fn update_content(
        &self,
        id: DbId,
        content: &str,
        note: Option<ModerationNote>,
    ) -> StoreResult<Comment>;

    /// Persist moderation flags together with the log entry for the change.
    async fn set_moderation(
        &self,
        id: DbId,
        flags: ModerationFlags,
        note: ModerationNote,
    ) -> StoreResult<Comment>;

    /// Delete the comment and all of its descendants, returning how many
    /// comments were removed. With a `moderator_id` a `deleted` log entry
    /// is written in the same write.
    async fn delete_subtree(&self, id: DbId, moderator_id: Option<DbId>) -> StoreResult<u64>;

    /// Record a like by `user_id`. Idempotent.
    async fn add_like(&self, comment_id: DbId, user_id: DbId) -> StoreResult<LikeStatus>;

    /// Withdraw a like by `user_id`. Idempotent.
    async fn remove_like(&self, comment_id: DbId, user_id: DbId) -> StoreResult<LikeStatus>;

    async fn liked_comment_ids(&self, user_id: DbId, article_id: DbId) -> StoreResult<Vec<DbId>>;

    /// Insert a report; `Conflict` when the reporter already reported it.
    async fn insert_report(
        &self,
        comment_id: DbId,
        reporter_id: DbId,
        reason: ReportReason,
        description: &str,
    ) -> StoreResult<CommentReport>;

    async fn list_reports(&self, unresolved_only: bool) -> StoreResult<Vec<CommentReport>>;

    async fn resolve_report(&self, id: DbId, resolved_by: DbId) -> StoreResult<CommentReport>;

    async fn list_for_moderation(
        &self,
        filter: ModerationFilter,
        article_id: Option<DbId>,
    ) -> StoreResult<Vec<ModerationComment>>;

    async fn list_log(&self, comment_id: Option<DbId>) -> StoreResult<Vec<ModerationLogEntry>>;
}

/* --------------------------------------------------------------------------
   Postgres
   -------------------------------------------------------------------------- */

/// [`CommentStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgCommentStore {
    pool: DbPool,
}

impl PgCommentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// PostgreSQL unique violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// PostgreSQL foreign key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn find_article(&self, id: DbId) -> StoreResult<Option<Article>> {
        Ok(ArticleRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_public_comments(
        &self,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> StoreResult<Vec<Comment>> {
        Ok(CommentRepo::list_public(&self.pool, article_id, ordering).await?)
    }

    async fn find_comment(&self, id: DbId) -> StoreResult<Option<Comment>> {
        Ok(CommentRepo::find_by_id(&self.pool, id).await?)
    }

    async fn insert_comment(&self, input: &NewComment) -> StoreResult<Comment> {
        CommentRepo::create(&self.pool, input).await.map_err(|e| {
            // The parent was deleted between validation and insert.
            if is_foreign_key_violation(&e) {
                StoreError::Core(CoreError::field("parent", "Parent comment no longer exists"))
            } else {
                e.into()
            }
        })
    }

    async fn update_content(
        &self,
        id: DbId,
        content: &str,
        note: Option<ModerationNote>,
    ) -> StoreResult<Comment> {
        let mut tx = self.pool.begin().await?;
        let comment = CommentRepo::update_content(&mut tx, id, content)
            .await?
            .ok_or_else(|| comment_not_found(id))?;
        if let Some(note) = note {
            ModerationLogRepo::create(&mut tx, id, note.moderator_id, note.action.as_str(), "")
                .await?;
        }
        tx.commit().await?;
        Ok(comment)
    }

    async fn set_moderation(
        &self,
        id: DbId,
        flags: ModerationFlags,
        note: ModerationNote,
    ) -> StoreResult<Comment> {
        let mut tx = self.pool.begin().await?;
        let comment = CommentRepo::set_moderation(&mut tx, id, flags)
            .await?
            .ok_or_else(|| comment_not_found(id))?;
        ModerationLogRepo::create(&mut tx, id, note.moderator_id, note.action.as_str(), "")
            .await?;
        tx.commit().await?;
        Ok(comment)
    }

    async fn delete_subtree(&self, id: DbId, moderator_id: Option<DbId>) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let removed = CommentRepo::delete_subtree(&mut tx, id).await?;
        if let Some(moderator_id) = moderator_id.filter(|_| removed > 0) {
            ModerationLogRepo::create(
                &mut tx,
                id,
                moderator_id,
                ModerationAction::Deleted.as_str(),
                &deletion_reason(removed),
            )
            .await?;
        }
        tx.commit().await?;
        Ok(removed)
    }

    async fn add_like(&self, comment_id: DbId, user_id: DbId) -> StoreResult<LikeStatus> {
        let mut tx = self.pool.begin().await?;
        let inserted = CommentLikeRepo::insert(&mut tx, comment_id, user_id)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    comment_not_found(comment_id)
                } else {
                    e.into()
                }
            })?;
        let like_count = if inserted {
            CommentRepo::adjust_like_count(&mut tx, comment_id, 1).await?
        } else {
            CommentRepo::like_count(&mut tx, comment_id).await?
        };
        tx.commit().await?;
        Ok(LikeStatus {
            liked: true,
            like_count,
        })
    }

    async fn remove_like(&self, comment_id: DbId, user_id: DbId) -> StoreResult<LikeStatus> {
        let mut tx = self.pool.begin().await?;
        let deleted = CommentLikeRepo::delete(&mut tx, comment_id, user_id).await?;
        let like_count = if deleted {
            CommentRepo::adjust_like_count(&mut tx, comment_id, -1).await?
        } else {
            CommentRepo::like_count(&mut tx, comment_id)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => comment_not_found(comment_id),
                    other => other.into(),
                })?
        };
        tx.commit().await?;
        Ok(LikeStatus {
            liked: false,
            like_count,
        })
    }

    async fn liked_comment_ids(&self, user_id: DbId, article_id: DbId) -> StoreResult<Vec<DbId>> {
        Ok(CommentLikeRepo::liked_ids_for_article(&self.pool, user_id, article_id).await?)
    }

    async fn insert_report(
        &self,
        comment_id: DbId,
        reporter_id: DbId,
        reason: ReportReason,
        description: &str,
    ) -> StoreResult<CommentReport> {
        CommentReportRepo::create(&self.pool, comment_id, reporter_id, reason.as_str(), description)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Core(CoreError::Conflict(
                        "You have already reported this comment".into(),
                    ))
                } else if is_foreign_key_violation(&e) {
                    comment_not_found(comment_id)
                } else {
                    e.into()
                }
            })
    }

    async fn list_reports(&self, unresolved_only: bool) -> StoreResult<Vec<CommentReport>> {
        Ok(CommentReportRepo::list(&self.pool, unresolved_only).await?)
    }

    async fn resolve_report(&self, id: DbId, resolved_by: DbId) -> StoreResult<CommentReport> {
        CommentReportRepo::resolve(&self.pool, id, resolved_by)
            .await?
            .ok_or_else(|| {
                StoreError::Core(CoreError::NotFound {
                    entity: "CommentReport",
                    id,
                })
            })
    }

    async fn list_for_moderation(
        &self,
        filter: ModerationFilter,
        article_id: Option<DbId>,
    ) -> StoreResult<Vec<ModerationComment>> {
        Ok(CommentRepo::list_for_moderation(&self.pool, filter, article_id).await?)
    }

    async fn list_log(&self, comment_id: Option<DbId>) -> StoreResult<Vec<ModerationLogEntry>> {
        Ok(ModerationLogRepo::list(&self.pool, comment_id).await?)
    }
}
