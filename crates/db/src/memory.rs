//! In-process [`CommentStore`].
//!
//! Mirrors the Postgres behaviour (ordering, cascade delete, unique likes
//! and reports) over plain maps behind a single `RwLock`. Used by the API
//! integration tests and by the server when no `DATABASE_URL` is set.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use quill_core::comments::{
    deletion_reason, CommentOrdering, ModerationAction, ModerationFilter, ReportReason,
};
use quill_core::error::CoreError;
use quill_core::moderation::{ModerationFlags, ModerationState};
use quill_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::article::{Article, CreateArticle};
use crate::models::comment::{Comment, LikeStatus, ModerationComment, NewComment};
use crate::models::moderation_log::{ModerationLogEntry, ModerationNote};
use crate::models::report::CommentReport;
use crate::store::{comment_not_found, CommentStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    last_id: DbId,
    articles: BTreeMap<DbId, Article>,
    comments: BTreeMap<DbId, Comment>,
    likes: HashSet<(DbId, DbId)>,
    reports: BTreeMap<DbId, CommentReport>,
    log: Vec<ModerationLogEntry>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn comment_mut(&mut self, id: DbId) -> StoreResult<&mut Comment> {
        self.comments.get_mut(&id).ok_or_else(|| comment_not_found(id))
    }

    fn append_log(
        &mut self,
        comment_id: DbId,
        moderator_id: DbId,
        action: ModerationAction,
        reason: String,
    ) {
        let entry = ModerationLogEntry {
            id: self.next_id(),
            comment_id,
            moderator_id,
            action: action.as_str().to_string(),
            reason,
            created_at: Utc::now(),
        };
        self.log.push(entry);
    }
}

/// A [`CommentStore`] kept entirely in memory.
#[derive(Default)]
pub struct MemoryCommentStore {
    tables: RwLock<Tables>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an article. Articles have no API of their own here, so tests
    /// and local runs seed them directly.
    pub async fn insert_article(&self, input: CreateArticle) -> Article {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let article = Article {
            id: t.next_id(),
            title: input.title,
            status: input.status,
            allow_comments: input.allow_comments,
            created_at: now,
            updated_at: now,
        };
        t.articles.insert(article.id, article.clone());
        article
    }
}

fn sort_comments(comments: &mut [Comment], ordering: CommentOrdering) {
    match ordering {
        CommentOrdering::CreatedAsc => {
            comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)))
        }
        CommentOrdering::CreatedDesc => {
            comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)))
        }
        CommentOrdering::LikesDesc => comments.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then((a.created_at, a.id).cmp(&(b.created_at, b.id)))
        }),
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_article(&self, id: DbId) -> StoreResult<Option<Article>> {
        Ok(self.tables.read().await.articles.get(&id).cloned())
    }

    async fn list_public_comments(
        &self,
        article_id: DbId,
        ordering: CommentOrdering,
    ) -> StoreResult<Vec<Comment>> {
        let t = self.tables.read().await;
        let mut out: Vec<Comment> = t
            .comments
            .values()
            .filter(|c| c.article_id == article_id && c.state().is_public())
            .cloned()
            .collect();
        sort_comments(&mut out, ordering);
        Ok(out)
    }

    async fn find_comment(&self, id: DbId) -> StoreResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn insert_comment(&self, input: &NewComment) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;
        if !t.articles.contains_key(&input.article_id) {
            return Err(StoreError::Core(CoreError::field(
                "article",
                "Article does not exist",
            )));
        }
        if let Some(parent) = input.parent_id {
            if !t.comments.contains_key(&parent) {
                return Err(StoreError::Core(CoreError::field(
                    "parent",
                    "Parent comment no longer exists",
                )));
            }
        }
        let now = Utc::now();
        let comment = Comment {
            id: t.next_id(),
            article_id: input.article_id,
            author_id: input.author_id,
            parent_id: input.parent_id,
            content: input.content.clone(),
            is_approved: input.is_approved,
            is_spam: false,
            is_edited: false,
            edited_at: None,
            like_count: 0,
            depth: input.depth,
            created_at: now,
            updated_at: now,
        };
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_content(
        &self,
        id: DbId,
        content: &str,
        note: Option<ModerationNote>,
    ) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;
        let comment = t.comment_mut(id)?;
        let now = Utc::now();
        comment.content = content.to_string();
        comment.is_edited = true;
        comment.edited_at = Some(now);
        comment.updated_at = now;
        let updated = comment.clone();
        if let Some(note) = note {
            t.append_log(id, note.moderator_id, note.action, String::new());
        }
        Ok(updated)
    }

    async fn set_moderation(
        &self,
        id: DbId,
        flags: ModerationFlags,
        note: ModerationNote,
    ) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;
        let comment = t.comment_mut(id)?;
        comment.is_approved = flags.is_approved;
        comment.is_spam = flags.is_spam;
        comment.updated_at = Utc::now();
        let updated = comment.clone();
        t.append_log(id, note.moderator_id, note.action, String::new());
        Ok(updated)
    }

    async fn delete_subtree(&self, id: DbId, moderator_id: Option<DbId>) -> StoreResult<u64> {
        let mut t = self.tables.write().await;
        if !t.comments.contains_key(&id) {
            return Ok(0);
        }

        let mut doomed: HashSet<DbId> = HashSet::from([id]);
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for c in t.comments.values() {
                if c.parent_id == Some(current) && doomed.insert(c.id) {
                    frontier.push(c.id);
                }
            }
        }

        t.comments.retain(|cid, _| !doomed.contains(cid));
        t.likes.retain(|(cid, _)| !doomed.contains(cid));
        t.reports.retain(|_, r| !doomed.contains(&r.comment_id));
        let removed = doomed.len() as u64;
        if let Some(moderator_id) = moderator_id {
            t.append_log(id, moderator_id, ModerationAction::Deleted, deletion_reason(removed));
        }
        Ok(removed)
    }

    async fn add_like(&self, comment_id: DbId, user_id: DbId) -> StoreResult<LikeStatus> {
        let mut t = self.tables.write().await;
        t.comment_mut(comment_id)?;
        let inserted = t.likes.insert((comment_id, user_id));
        let comment = t.comment_mut(comment_id)?;
        if inserted {
            comment.like_count += 1;
        }
        Ok(LikeStatus {
            liked: true,
            like_count: comment.like_count,
        })
    }

    async fn remove_like(&self, comment_id: DbId, user_id: DbId) -> StoreResult<LikeStatus> {
        let mut t = self.tables.write().await;
        t.comment_mut(comment_id)?;
        let removed = t.likes.remove(&(comment_id, user_id));
        let comment = t.comment_mut(comment_id)?;
        if removed {
            comment.like_count = (comment.like_count - 1).max(0);
        }
        Ok(LikeStatus {
            liked: false,
            like_count: comment.like_count,
        })
    }

    async fn liked_comment_ids(&self, user_id: DbId, article_id: DbId) -> StoreResult<Vec<DbId>> {
        let t = self.tables.read().await;
        let mut ids: Vec<DbId> = t
            .likes
            .iter()
            .filter(|(cid, uid)| {
                *uid == user_id
                    && t
                        .comments
                        .get(cid)
                        .is_some_and(|c| c.article_id == article_id)
            })
            .map(|(cid, _)| *cid)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn insert_report(
        &self,
        comment_id: DbId,
        reporter_id: DbId,
        reason: ReportReason,
        description: &str,
    ) -> StoreResult<CommentReport> {
        let mut t = self.tables.write().await;
        t.comment_mut(comment_id)?;
        if t
            .reports
            .values()
            .any(|r| r.comment_id == comment_id && r.reporter_id == reporter_id)
        {
            return Err(StoreError::Core(CoreError::Conflict(
                "You have already reported this comment".into(),
            )));
        }
        let report = CommentReport {
            id: t.next_id(),
            comment_id,
            reporter_id,
            reason: reason.as_str().to_string(),
            description: description.to_string(),
            is_resolved: false,
            resolved_by: None,
            resolved_at: None,
            created_at: Utc::now(),
        };
        t.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn list_reports(&self, unresolved_only: bool) -> StoreResult<Vec<CommentReport>> {
        let t = self.tables.read().await;
        let mut out: Vec<CommentReport> = t
            .reports
            .values()
            .filter(|r| !(unresolved_only && r.is_resolved))
            .cloned()
            .collect();
        out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(out)
    }

    async fn resolve_report(&self, id: DbId, resolved_by: DbId) -> StoreResult<CommentReport> {
        let mut t = self.tables.write().await;
        let report = t.reports.get_mut(&id).ok_or(StoreError::Core(CoreError::NotFound {
            entity: "CommentReport",
            id,
        }))?;
        if !report.is_resolved {
            report.is_resolved = true;
            report.resolved_by = Some(resolved_by);
            report.resolved_at = Some(Utc::now());
        }
        Ok(report.clone())
    }

    async fn list_for_moderation(
        &self,
        filter: ModerationFilter,
        article_id: Option<DbId>,
    ) -> StoreResult<Vec<ModerationComment>> {
        let t = self.tables.read().await;
        let mut comments: Vec<&Comment> = t
            .comments
            .values()
            .filter(|c| article_id.is_none_or(|a| c.article_id == a))
            .filter(|c| match filter {
                ModerationFilter::Pending => c.state() == ModerationState::Pending,
                ModerationFilter::Spam => c.state() == ModerationState::Spam,
                ModerationFilter::All => true,
            })
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(comments
            .into_iter()
            .map(|c| ModerationComment {
                comment: c.clone(),
                article_title: t
                    .articles
                    .get(&c.article_id)
                    .map(|a| a.title.clone())
                    .unwrap_or_default(),
                report_count: t
                    .reports
                    .values()
                    .filter(|r| r.comment_id == c.id && !r.is_resolved)
                    .count() as i64,
            })
            .collect())
    }

    async fn list_log(&self, comment_id: Option<DbId>) -> StoreResult<Vec<ModerationLogEntry>> {
        let t = self.tables.read().await;
        let mut out: Vec<ModerationLogEntry> = t
            .log
            .iter()
            .filter(|e| comment_id.is_none_or(|id| e.comment_id == id))
            .cloned()
            .collect();
        out.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(out)
    }
}
