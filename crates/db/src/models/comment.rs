//! Comment, like, and moderation-view models.

use quill_core::moderation::ModerationState;
use quill_core::thread::{ThreadItem, ThreadView};
use quill_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/* --------------------------------------------------------------------------
   Comments
   -------------------------------------------------------------------------- */

/// A row from the `comments` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: DbId,
    pub article_id: DbId,
    pub author_id: DbId,
    pub parent_id: Option<DbId>,
    pub content: String,
    pub is_approved: bool,
    pub is_spam: bool,
    pub is_edited: bool,
    pub edited_at: Option<Timestamp>,
    pub like_count: i32,
    pub depth: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Comment {
    pub fn state(&self) -> ModerationState {
        ModerationState::from_flags(self.is_approved, self.is_spam)
    }
}

impl ThreadItem for Comment {
    fn id(&self) -> DbId {
        self.id
    }

    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }

    fn depth(&self) -> i32 {
        self.depth
    }
}

/// Request body for `POST /comments/`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    pub article: DbId,
    #[serde(default)]
    pub parent: Option<DbId>,
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub content: String,
}

/// Request body for `PATCH /comments/{id}/`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateComment {
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub content: String,
}

/// Fully resolved insert for the `comments` table.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub article_id: DbId,
    pub author_id: DbId,
    pub parent_id: Option<DbId>,
    pub content: String,
    pub depth: i32,
    pub is_approved: bool,
}

/// Nested public listing of an article's comments.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    /// Number of comments in the forest.
    pub count: usize,
    pub threads: Vec<ThreadView<Comment>>,
}

/* --------------------------------------------------------------------------
   Likes
   -------------------------------------------------------------------------- */

/// Like state of one comment for the calling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub like_count: i32,
}

/* --------------------------------------------------------------------------
   Moderation views
   -------------------------------------------------------------------------- */

/// A comment as shown in moderation listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ModerationComment {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub article_title: String,
    /// Unresolved reports against this comment.
    pub report_count: i64,
}
