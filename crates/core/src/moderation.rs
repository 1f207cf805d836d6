//! Comment moderation state machine.
//!
//! State is derived from the stored `is_approved` / `is_spam` flags:
//!
//! ```text
//! Pending --approve--> Approved
//! Pending --spam-----> Spam
//! Approved --spam----> Spam
//! ```
//!
//! Spam is terminal. Deletion is not a transition and is allowed from any
//! state.

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationState {
    Pending,
    Approved,
    Spam,
}

/// Flags to persist after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationFlags {
    pub is_approved: bool,
    pub is_spam: bool,
}

impl ModerationState {
    /// Spam wins over approval when both flags are somehow set.
    pub fn from_flags(is_approved: bool, is_spam: bool) -> Self {
        match (is_approved, is_spam) {
            (_, true) => Self::Spam,
            (true, false) => Self::Approved,
            (false, false) => Self::Pending,
        }
    }

    pub fn flags(self) -> ModerationFlags {
        match self {
            Self::Pending => ModerationFlags {
                is_approved: false,
                is_spam: false,
            },
            Self::Approved => ModerationFlags {
                is_approved: true,
                is_spam: false,
            },
            Self::Spam => ModerationFlags {
                is_approved: false,
                is_spam: true,
            },
        }
    }

    /// Approve. Approving an approved comment is a no-op; spam cannot be
    /// approved.
    pub fn approve(self) -> Result<Self, CoreError> {
        match self {
            Self::Pending | Self::Approved => Ok(Self::Approved),
            Self::Spam => Err(CoreError::Conflict(
                "Comment is marked as spam and cannot be approved".into(),
            )),
        }
    }

    /// Mark as spam. Always succeeds and clears approval.
    pub fn mark_spam(self) -> Self {
        Self::Spam
    }

    /// Whether the comment is shown in the public listing.
    pub fn is_public(self) -> bool {
        self == Self::Approved
    }
}
