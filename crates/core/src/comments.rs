//! Comment constants, enums, and validation functions.
//!
//! Shared by the store implementations and the API layer so both enforce
//! the same content, nesting, and article rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length (in characters) of a comment's content.
pub const MAX_COMMENT_LENGTH: usize = 1_000;

/// Maximum length (in characters) of a report description.
pub const MAX_REPORT_DESCRIPTION_LENGTH: usize = 1_000;

/// Replies are not accepted on comments at or beyond this depth.
pub const DEFAULT_MAX_DEPTH: i32 = 3;

/* --------------------------------------------------------------------------
Ordering
-------------------------------------------------------------------------- */

/// Sort order for an article's comment listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentOrdering {
    #[default]
    #[serde(rename = "created_at")]
    CreatedAsc,
    #[serde(rename = "-created_at")]
    CreatedDesc,
    /// Most liked first; ties fall back to creation ascending.
    #[serde(rename = "-like_count")]
    LikesDesc,
}

impl CommentOrdering {
    /// Parse the `?ordering=` query value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "created_at" => Ok(Self::CreatedAsc),
            "-created_at" => Ok(Self::CreatedDesc),
            "-like_count" => Ok(Self::LikesDesc),
            other => Err(CoreError::field(
                "ordering",
                format!(
                    "Invalid ordering '{other}'. Must be one of: created_at, -created_at, -like_count"
                ),
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_at",
            Self::CreatedDesc => "-created_at",
            Self::LikesDesc => "-like_count",
        }
    }

    /// SQL `ORDER BY` clause for this ordering.
    pub fn sql_order_by(self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_at ASC, id ASC",
            Self::CreatedDesc => "created_at DESC, id DESC",
            Self::LikesDesc => "like_count DESC, created_at ASC, id ASC",
        }
    }
}

/* --------------------------------------------------------------------------
Articles
-------------------------------------------------------------------------- */

pub const ARTICLE_STATUS_DRAFT: &str = "draft";
pub const ARTICLE_STATUS_PUBLISHED: &str = "published";
pub const ARTICLE_STATUS_ARCHIVED: &str = "archived";

/// Reject comments on articles that are unpublished or closed for comments.
pub fn check_article_open(status: &str, allow_comments: bool) -> Result<(), CoreError> {
    if status != ARTICLE_STATUS_PUBLISHED {
        return Err(CoreError::field(
            "article",
            "Comments are only accepted on published articles",
        ));
    }
    if !allow_comments {
        return Err(CoreError::field(
            "article",
            "Comments are disabled for this article",
        ));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Reports
-------------------------------------------------------------------------- */

/// Reason a user gives when reporting a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Inappropriate,
    Harassment,
    Copyright,
    Other,
}

impl ReportReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Inappropriate => "inappropriate",
            Self::Harassment => "harassment",
            Self::Copyright => "copyright",
            Self::Other => "other",
        }
    }
}

/* --------------------------------------------------------------------------
Moderation log
-------------------------------------------------------------------------- */

/// Action recorded in the moderation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approved,
    MarkedSpam,
    Deleted,
    Edited,
}

impl ModerationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::MarkedSpam => "marked_spam",
            Self::Deleted => "deleted",
            Self::Edited => "edited",
        }
    }
}

/// Log reason for a moderator deleting a comment subtree.
pub fn deletion_reason(removed: u64) -> String {
    format!("Removed {removed} comment(s)")
}

/// Filter for the moderation comment listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationFilter {
    /// Not yet approved and not spam.
    Pending,
    Spam,
    #[default]
    All,
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate comment content and return it trimmed.
///
/// Length is counted in characters, not bytes.
pub fn validate_comment_content(content: &str, max_length: usize) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::field("content", "Comment must not be empty"));
    }
    if trimmed.chars().count() > max_length {
        return Err(CoreError::field(
            "content",
            format!("Comment exceeds maximum length of {max_length} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a report description (may be empty).
pub fn validate_report_description(description: &str) -> Result<String, CoreError> {
    let trimmed = description.trim();
    if trimmed.chars().count() > MAX_REPORT_DESCRIPTION_LENGTH {
        return Err(CoreError::field(
            "description",
            format!(
                "Description exceeds maximum length of {MAX_REPORT_DESCRIPTION_LENGTH} characters"
            ),
        ));
    }
    Ok(trimmed.to_string())
}

/// Check that a reply to `parent` is allowed, returning the reply's depth.
///
/// The parent must be on the same article and shallower than `max_depth`.
pub fn reply_depth(
    article_id: DbId,
    parent_article_id: DbId,
    parent_depth: i32,
    max_depth: i32,
) -> Result<i32, CoreError> {
    if parent_article_id != article_id {
        return Err(CoreError::field(
            "parent",
            "Parent comment must belong to the same article",
        ));
    }
    if parent_depth >= max_depth {
        return Err(CoreError::field(
            "parent",
            format!("Replies cannot be nested deeper than {max_depth} levels"),
        ));
    }
    Ok(parent_depth + 1)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
