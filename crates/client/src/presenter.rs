//! Thread presenter: the client-side state around one article's comments.
//!
//! Every mutation follows the same cycle. Mark the comment busy, do the
//! round-trip, clear the busy flag whatever the outcome, then either record
//! a user-facing error or re-fetch the whole list. Nothing is retried and
//! in-flight calls are never cancelled.

use std::collections::{HashMap, HashSet};

use quill_core::comments::{CommentOrdering, ReportReason, DEFAULT_MAX_DEPTH};
use quill_core::thread::{Thread, ThreadView};
use quill_core::types::DbId;

use crate::api::CommentApi;
use crate::error::ClientResult;
use crate::model::{Comment, NewComment, NewReport};

pub struct ThreadPresenter<A> {
    api: A,
    article_id: DbId,
    ordering: CommentOrdering,
    max_depth: i32,
    thread: Thread<Comment>,
    /// Comments the current user has liked, as last toggled or fetched.
    liked: HashSet<DbId>,
    /// Local like counts that differ from the last fetch.
    like_counts: HashMap<DbId, i32>,
    busy: HashSet<DbId>,
    submitting: bool,
    editing: Option<DbId>,
    reply_target: Option<DbId>,
    error: Option<String>,
}

impl<A: CommentApi> ThreadPresenter<A> {
    pub fn new(api: A, article_id: DbId) -> Self {
        Self {
            api,
            article_id,
            ordering: CommentOrdering::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            thread: Thread::build(Vec::new()),
            liked: HashSet::new(),
            like_counts: HashMap::new(),
            busy: HashSet::new(),
            submitting: false,
            editing: None,
            reply_target: None,
            error: None,
        }
    }

    /// Override the reply depth cap (must match the server's).
    pub fn with_max_depth(mut self, max_depth: i32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /* ---- Read-only state ---- */

    pub fn thread(&self) -> &Thread<Comment> {
        &self.thread
    }

    /// Owned nested view for rendering. `like_count` already includes
    /// toggles still waiting for a re-fetch; use [`Self::is_liked`] for the
    /// liked marker.
    pub fn views(&self) -> Vec<ThreadView<Comment>> {
        let comments = self
            .thread
            .iter()
            .map(|c| {
                let mut c = c.clone();
                if let Some(&count) = self.like_counts.get(&c.id) {
                    c.like_count = count;
                }
                c
            })
            .collect();
        Thread::build(comments).into_views(self.max_depth)
    }

    pub fn total_count(&self) -> usize {
        self.thread.total_count()
    }

    pub fn ordering(&self) -> CommentOrdering {
        self.ordering
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_busy(&self, id: DbId) -> bool {
        self.busy.contains(&id)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_liked(&self, id: DbId) -> bool {
        self.liked.contains(&id)
    }

    /// Like count to display: the local value if a toggle is pending a
    /// re-fetch, otherwise the fetched one.
    pub fn like_count(&self, id: DbId) -> i32 {
        self.like_counts.get(&id).copied().unwrap_or_else(|| {
            self.thread
                .find(id)
                .map(|n| n.item().like_count)
                .unwrap_or(0)
        })
    }

    pub fn can_reply(&self, id: DbId) -> bool {
        self.thread.can_reply(id, self.max_depth)
    }

    /// The comment `id` answers, for "replying to ..." labels.
    pub fn replying_to(&self, id: DbId) -> Option<&Comment> {
        self.thread.replying_to(id)
    }

    pub fn editing(&self) -> Option<DbId> {
        self.editing
    }

    pub fn reply_target(&self) -> Option<DbId> {
        self.reply_target
    }

    /* ---- Composer state ---- */

    /// Open the reply composer under `id`. Ignored when the comment is at
    /// the depth cap or unknown.
    pub fn start_reply(&mut self, id: DbId) -> bool {
        if !self.can_reply(id) {
            return false;
        }
        self.reply_target = Some(id);
        self.editing = None;
        true
    }

    pub fn cancel_reply(&mut self) {
        self.reply_target = None;
    }

    pub fn start_edit(&mut self, id: DbId) -> bool {
        if self.thread.find(id).is_none() {
            return false;
        }
        self.editing = Some(id);
        self.reply_target = None;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /* ---- Fetching ---- */

    /// Re-fetch the article's comments and rebuild the thread. Local like
    /// state is replaced by the server's.
    ///
    /// The list is applied even when the liked-ids lookup fails afterwards;
    /// in that case the previous liked markers stay and the error is
    /// returned.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let result = self.fetch().await;
        if let Err(e) = &result {
            self.error = Some(e.user_message());
        }
        result
    }

    async fn fetch(&mut self) -> ClientResult<()> {
        let comments = self
            .api
            .list_comments(self.article_id, self.ordering)
            .await?;

        tracing::debug!(
            article_id = self.article_id,
            count = comments.len(),
            "Comment thread refreshed"
        );
        self.thread = Thread::build(comments);
        self.like_counts.clear();

        if !self.api.is_authenticated() {
            self.liked.clear();
            return Ok(());
        }
        match self.api.liked_comment_ids(self.article_id).await {
            Ok(ids) => {
                self.liked = ids.into_iter().collect();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    article_id = self.article_id,
                    error = %e,
                    "Liked comments unavailable, keeping previous markers"
                );
                Err(e)
            }
        }
    }

    pub async fn set_ordering(&mut self, ordering: CommentOrdering) -> ClientResult<()> {
        self.ordering = ordering;
        self.refresh().await
    }

    /* ---- Mutations ---- */

    /// Mark `id` busy. False when a call for it is already in flight.
    fn begin(&mut self, id: DbId) -> bool {
        self.busy.insert(id)
    }

    /// Clear the busy flag, then surface the error or re-fetch.
    async fn finish<T>(&mut self, id: DbId, result: ClientResult<T>) -> ClientResult<T> {
        self.busy.remove(&id);
        self.settle(result).await
    }

    async fn settle<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        match result {
            Ok(value) => {
                self.error = None;
                self.refresh().await?;
                Ok(value)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Post `content` as a top-level comment, or as a reply when a reply
    /// target is open. Ignored while a submission is in flight.
    pub async fn submit(&mut self, content: &str) -> ClientResult<()> {
        if self.submitting {
            return Ok(());
        }
        self.submitting = true;

        let input = NewComment {
            article: self.article_id,
            parent: self.reply_target,
            content: content.to_string(),
        };
        let result = self.api.create_comment(&input).await;
        self.submitting = false;

        if result.is_ok() {
            self.reply_target = None;
        }
        self.settle(result).await.map(|_| ())
    }

    /// Save the comment currently being edited.
    pub async fn save_edit(&mut self, content: &str) -> ClientResult<()> {
        let Some(id) = self.editing else {
            return Ok(());
        };
        if !self.begin(id) {
            return Ok(());
        }

        let result = self.api.update_comment(id, content).await;
        if result.is_ok() {
            self.editing = None;
        }
        self.finish(id, result).await.map(|_| ())
    }

    pub async fn delete(&mut self, id: DbId) -> ClientResult<()> {
        if !self.begin(id) {
            return Ok(());
        }
        let result = self.api.delete_comment(id).await;
        if result.is_ok() {
            if self.editing == Some(id) {
                self.editing = None;
            }
            if self.reply_target == Some(id) {
                self.reply_target = None;
            }
        }
        self.finish(id, result).await.map(|_| ())
    }

    /// Like or unlike. The displayed count moves by one immediately; the
    /// following re-fetch settles it.
    pub async fn toggle_like(&mut self, id: DbId) -> ClientResult<()> {
        if !self.begin(id) {
            return Ok(());
        }

        let was_liked = self.liked.contains(&id);
        let count = self.like_count(id);
        if was_liked {
            self.liked.remove(&id);
            self.like_counts.insert(id, (count - 1).max(0));
        } else {
            self.liked.insert(id);
            self.like_counts.insert(id, count + 1);
        }

        let result = if was_liked {
            self.api.unlike_comment(id).await
        } else {
            self.api.like_comment(id).await
        };
        self.finish(id, result).await.map(|_| ())
    }

    pub async fn report(
        &mut self,
        id: DbId,
        reason: ReportReason,
        description: &str,
    ) -> ClientResult<()> {
        if !self.begin(id) {
            return Ok(());
        }
        let report = NewReport {
            reason,
            description: description.to_string(),
        };
        let result = self.api.report_comment(id, &report).await;
        self.finish(id, result).await
    }

    pub async fn approve(&mut self, id: DbId) -> ClientResult<()> {
        if !self.begin(id) {
            return Ok(());
        }
        let result = self.api.approve_comment(id).await;
        self.finish(id, result).await.map(|_| ())
    }

    pub async fn mark_spam(&mut self, id: DbId) -> ClientResult<()> {
        if !self.begin(id) {
            return Ok(());
        }
        let result = self.api.mark_comment_as_spam(id).await;
        self.finish(id, result).await.map(|_| ())
    }
}
