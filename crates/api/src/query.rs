//! Query parameter types for the comment endpoints.

use quill_core::comments::ModerationFilter;
use quill_core::types::DbId;
use serde::Deserialize;

/// `?ordering=&tree=` on the public article listing.
#[derive(Debug, Default, Deserialize)]
pub struct CommentListParams {
    /// `created_at`, `-created_at` or `-like_count`.
    pub ordering: Option<String>,
    /// Return the nested thread instead of the flat list.
    #[serde(default)]
    pub tree: bool,
}

/// `?article=&status=` on the moderation listing.
#[derive(Debug, Default, Deserialize)]
pub struct ModerationListParams {
    pub article: Option<DbId>,
    #[serde(default)]
    pub status: ModerationFilter,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportListParams {
    #[serde(default)]
    pub unresolved: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModerationLogParams {
    pub comment: Option<DbId>,
}
