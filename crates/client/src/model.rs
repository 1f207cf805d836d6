//! Wire types as returned by the comments API.

use chrono::{DateTime, Utc};
use quill_core::comments::ReportReason;
use quill_core::thread::ThreadItem;
use quill_core::types::DbId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: DbId,
    pub article_id: DbId,
    pub author_id: DbId,
    pub parent_id: Option<DbId>,
    pub content: String,
    pub is_approved: bool,
    pub is_spam: bool,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub like_count: i32,
    pub depth: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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

/// Body of `POST /comments/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub article: DbId,
    pub parent: Option<DbId>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReport {
    pub reason: ReportReason,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub like_count: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deleted {
    pub deleted: u64,
}
