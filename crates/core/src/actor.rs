//! The acting user, passed explicitly into every store operation.

use crate::error::CoreError;
use crate::roles::is_elevated;
use crate::types::DbId;

/// Identity and role of the caller performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: String,
}

impl Actor {
    pub fn new(user_id: DbId, role: impl Into<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
        }
    }

    /// Whether the actor holds a moderator (admin or editor) role.
    pub fn is_moderator(&self) -> bool {
        is_elevated(&self.role)
    }

    /// Authors may modify their own comments; moderators may modify any.
    pub fn can_modify(&self, author_id: DbId) -> bool {
        self.user_id == author_id || self.is_moderator()
    }

    /// Reject with `Forbidden` unless [`Actor::can_modify`] holds.
    pub fn ensure_can_modify(&self, author_id: DbId) -> Result<(), CoreError> {
        if self.can_modify(author_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Only the author or a moderator may change this comment".into(),
            ))
        }
    }

    /// Reject with `Forbidden` unless the actor is a moderator.
    pub fn ensure_moderator(&self) -> Result<(), CoreError> {
        if self.is_moderator() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Moderator role required".into()))
        }
    }
}
