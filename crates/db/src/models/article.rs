//! Article model (only the fields comment rules read).

use quill_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `articles` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Article {
    pub id: DbId,
    pub title: String,
    pub status: String,
    pub allow_comments: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an article.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticle {
    pub title: String,
    pub status: String,
    pub allow_comments: bool,
}
