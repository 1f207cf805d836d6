//! Per-user fixed-window rate limiting for comment writes.
//!
//! Each `(user, action)` pair gets a counter that resets once its window has
//! elapsed. Moderators are exempt; handlers skip the check for them.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quill_core::error::CoreError;
use quill_core::types::DbId;
use tokio::sync::RwLock;

/// Rate-limited write actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitedAction {
    CreateComment,
    ReportComment,
}

/// Map size above which expired windows are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: RwLock<HashMap<(DbId, RateLimitedAction), Window>>,
}

impl RateLimiter {
    /// `limit` actions per minute; `0` disables limiting.
    pub fn per_minute(limit: u32) -> Self {
        Self::with_window(limit, Duration::from_secs(60))
    }

    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Count one `action` by `user_id`, or fail with `RateLimited` when the
    /// user has used up the current window.
    pub async fn check(&self, user_id: DbId, action: RateLimitedAction) -> Result<(), CoreError> {
        if self.limit == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut windows = self.windows.write().await;
        if windows.len() > PRUNE_THRESHOLD {
            let span = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < span);
        }

        let entry = windows.entry((user_id, action)).or_insert(Window {
            started: now,
            count: 0,
        });
        let elapsed = now.duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.limit {
            let remaining = self.window.saturating_sub(elapsed);
            return Err(CoreError::RateLimited {
                retry_after_secs: remaining.as_secs().max(1),
            });
        }
        entry.count += 1;
        Ok(())
    }

    /// Give back the slot taken by [`check`](Self::check) for a write that
    /// was then rejected.
    pub async fn release(&self, user_id: DbId, action: RateLimitedAction) {
        if self.limit == 0 {
            return;
        }
        if let Some(window) = self.windows.write().await.get_mut(&(user_id, action)) {
            window.count = window.count.saturating_sub(1);
        }
    }
}
