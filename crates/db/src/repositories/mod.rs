//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a `&mut PgConnection` when the call must join
//! a caller's transaction) as the first argument.

pub mod article_repo;
pub mod comment_like_repo;
pub mod comment_repo;
pub mod comment_report_repo;
pub mod moderation_log_repo;

pub use article_repo::ArticleRepo;
pub use comment_like_repo::CommentLikeRepo;
pub use comment_repo::CommentRepo;
pub use comment_report_repo::CommentReportRepo;
pub use moderation_log_repo::ModerationLogRepo;
