use quill_core::comments::ModerationAction;
use quill_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comment_moderation_log` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ModerationLogEntry {
    pub id: DbId,
    pub comment_id: DbId,
    pub moderator_id: DbId,
    pub action: String,
    pub reason: String,
    pub created_at: Timestamp,
}

/// Log entry written by the store in the same write as the change it
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationNote {
    pub moderator_id: DbId,
    pub action: ModerationAction,
}
