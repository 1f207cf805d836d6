//! Comment business rules over an arbitrary [`CommentStore`].
//!
//! Every operation that acts on behalf of a user takes the [`Actor`]
//! explicitly. Permission checks, content validation, reply depth limits
//! and moderation transitions all happen here before the store is touched.

use std::sync::Arc;

use quill_core::actor::Actor;
use quill_core::comments::{
    check_article_open, reply_depth, validate_comment_content, validate_report_description,
    CommentOrdering, ModerationAction, ModerationFilter, ARTICLE_STATUS_PUBLISHED,
    DEFAULT_MAX_DEPTH, MAX_COMMENT_LENGTH,
};
use quill_core::error::CoreError;
use quill_core::thread::Thread;
use quill_core::types::DbId;
use validator::Validate;

use crate::models::article::Article;
use crate::models::comment::{
    Comment, CommentThread, CreateComment, LikeStatus, ModerationComment, NewComment,
    UpdateComment,
};
use crate::models::moderation_log::{ModerationLogEntry, ModerationNote};
use crate::models::report::{CommentReport, CreateCommentReport};
use crate::store::{comment_not_found, CommentStore, StoreResult};

/// Tunable comment rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPolicy {
    /// Deepest depth that may still receive replies is `max_depth - 1`.
    pub max_depth: i32,
    /// Maximum content length in characters.
    pub max_length: usize,
    /// When false, every new comment is approved immediately.
    pub require_approval: bool,
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: MAX_COMMENT_LENGTH,
            require_approval: true,
        }
    }
}

/// Applies comment rules on top of a [`CommentStore`].
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
    policy: CommentPolicy,
}

impl CommentService {
    pub fn new(store: Arc<dyn CommentStore>, policy: CommentPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> CommentPolicy {
        self.policy
    }

    pub async fn health_check(&self) -> StoreResult<()> {
        self.store.health_check().await
    }

    /* ---- Reading ---- */

    async fn article(&self, id: DbId) -> StoreResult<Article> {
        self.store.find_article(id).await?.ok_or_else(|| {
            CoreError::NotFound {
                entity: "Article",
                id,
            }
            .into()
        })
    }

    async fn comment(&self, id: DbId) -> StoreResult<Comment> {
        self.store
            .find_comment(id)
            .await?
            .ok_or_else(|| comment_not_found(id))
    }

    /// Public flat listing: approved, non-spam comments of a published
    /// article. Unpublished articles list nothing.
    pub async fn list_comments(
        &self,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> StoreResult<Vec<Comment>> {
        let article = self.article(article_id).await?;
        if article.status != ARTICLE_STATUS_PUBLISHED {
            return Ok(Vec::new());
        }
        self.store.list_public_comments(article_id, ordering).await
    }

    /// Public listing assembled into a nested thread.
    pub async fn thread(
        &self,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> StoreResult<CommentThread> {
        let comments = self.list_comments(article_id, ordering).await?;
        let thread = Thread::build(comments);
        Ok(CommentThread {
            count: thread.total_count(),
            threads: thread.into_views(self.policy.max_depth),
        })
    }

    /// Fetch one comment. Comments that are not public are visible only to
    /// their author and to moderators; everyone else gets `NotFound`. Every
    /// action that targets an existing comment goes through this check.
    pub async fn get_comment(&self, viewer: Option<&Actor>, id: DbId) -> StoreResult<Comment> {
        let comment = self.comment(id).await?;
        let visible = comment.state().is_public()
            || viewer.is_some_and(|a| a.can_modify(comment.author_id));
        if visible {
            Ok(comment)
        } else {
            Err(comment_not_found(id))
        }
    }

    pub async fn liked_comment_ids(&self, actor: &Actor, article_id: DbId) -> StoreResult<Vec<DbId>> {
        self.store
            .liked_comment_ids(actor.user_id, article_id)
            .await
    }

    /* ---- Authoring ---- */

    /// Create a top-level comment or a reply.
    pub async fn create_comment(&self, actor: &Actor, input: &CreateComment) -> StoreResult<Comment> {
        input.validate().map_err(CoreError::from)?;
        let content = validate_comment_content(&input.content, self.policy.max_length)?;

        let article = self
            .store
            .find_article(input.article)
            .await?
            .ok_or_else(|| CoreError::field("article", "Article does not exist"))?;
        check_article_open(&article.status, article.allow_comments)?;

        let depth = match input.parent {
            Some(parent_id) => {
                // Replies under a hidden parent would surface as public roots.
                let parent = self
                    .store
                    .find_comment(parent_id)
                    .await?
                    .filter(|p| p.state().is_public())
                    .ok_or_else(|| CoreError::field("parent", "Parent comment does not exist"))?;
                reply_depth(
                    article.id,
                    parent.article_id,
                    parent.depth,
                    self.policy.max_depth,
                )?
            }
            None => 0,
        };

        let new = NewComment {
            article_id: article.id,
            author_id: actor.user_id,
            parent_id: input.parent,
            content,
            depth,
            is_approved: actor.is_moderator() || !self.policy.require_approval,
        };
        self.store.insert_comment(&new).await
    }

    /// Replace a comment's content. The edited flag is only set when the
    /// text actually changes.
    pub async fn update_comment(
        &self,
        actor: &Actor,
        id: DbId,
        input: &UpdateComment,
    ) -> StoreResult<Comment> {
        input.validate().map_err(CoreError::from)?;
        let comment = self.get_comment(Some(actor), id).await?;
        actor.ensure_can_modify(comment.author_id)?;
        let content = validate_comment_content(&input.content, self.policy.max_length)?;

        if content == comment.content {
            return Ok(comment);
        }

        let note = (actor.user_id != comment.author_id).then_some(ModerationNote {
            moderator_id: actor.user_id,
            action: ModerationAction::Edited,
        });
        self.store.update_content(id, &content, note).await
    }

    /// Delete a comment and all replies beneath it. Returns how many
    /// comments were removed.
    pub async fn delete_comment(&self, actor: &Actor, id: DbId) -> StoreResult<u64> {
        let comment = self.get_comment(Some(actor), id).await?;
        actor.ensure_can_modify(comment.author_id)?;

        let moderator = (actor.user_id != comment.author_id).then_some(actor.user_id);
        let removed = self.store.delete_subtree(id, moderator).await?;
        tracing::debug!(comment_id = id, removed, "Comment subtree deleted");
        Ok(removed)
    }

    /* ---- Reactions ---- */

    pub async fn like_comment(&self, actor: &Actor, id: DbId) -> StoreResult<LikeStatus> {
        self.get_comment(Some(actor), id).await?;
        self.store.add_like(id, actor.user_id).await
    }

    pub async fn unlike_comment(&self, actor: &Actor, id: DbId) -> StoreResult<LikeStatus> {
        self.get_comment(Some(actor), id).await?;
        self.store.remove_like(id, actor.user_id).await
    }

    pub async fn report_comment(
        &self,
        actor: &Actor,
        id: DbId,
        input: &CreateCommentReport,
    ) -> StoreResult<CommentReport> {
        input.validate().map_err(CoreError::from)?;
        let description = validate_report_description(&input.description)?;
        self.get_comment(Some(actor), id).await?;
        self.store
            .insert_report(id, actor.user_id, input.reason, &description)
            .await
    }

    /* ---- Moderation ---- */

    /// Approve a pending comment. Approving twice is a no-op; approving
    /// spam is a conflict.
    pub async fn approve_comment(&self, actor: &Actor, id: DbId) -> StoreResult<Comment> {
        actor.ensure_moderator()?;
        let comment = self.comment(id).await?;
        let current = comment.state();
        let next = current.approve()?;
        if next == current {
            return Ok(comment);
        }

        let note = ModerationNote {
            moderator_id: actor.user_id,
            action: ModerationAction::Approved,
        };
        self.store.set_moderation(id, next.flags(), note).await
    }

    /// Mark a comment as spam, clearing approval. Marking twice is a no-op.
    pub async fn mark_comment_as_spam(&self, actor: &Actor, id: DbId) -> StoreResult<Comment> {
        actor.ensure_moderator()?;
        let comment = self.comment(id).await?;
        let current = comment.state();
        let next = current.mark_spam();
        if next == current {
            return Ok(comment);
        }

        let note = ModerationNote {
            moderator_id: actor.user_id,
            action: ModerationAction::MarkedSpam,
        };
        self.store.set_moderation(id, next.flags(), note).await
    }

    pub async fn list_for_moderation(
        &self,
        actor: &Actor,
        filter: ModerationFilter,
        article_id: Option<DbId>,
    ) -> StoreResult<Vec<ModerationComment>> {
        actor.ensure_moderator()?;
        self.store.list_for_moderation(filter, article_id).await
    }

    pub async fn list_reports(
        &self,
        actor: &Actor,
        unresolved_only: bool,
    ) -> StoreResult<Vec<CommentReport>> {
        actor.ensure_moderator()?;
        self.store.list_reports(unresolved_only).await
    }

    pub async fn resolve_report(&self, actor: &Actor, id: DbId) -> StoreResult<CommentReport> {
        actor.ensure_moderator()?;
        self.store.resolve_report(id, actor.user_id).await
    }

    pub async fn list_moderation_log(
        &self,
        actor: &Actor,
        comment_id: Option<DbId>,
    ) -> StoreResult<Vec<ModerationLogEntry>> {
        actor.ensure_moderator()?;
        self.store.list_log(comment_id).await
    }
}
