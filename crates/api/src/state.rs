use std::sync::Arc;

use quill_db::CommentService;

use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Comment rules over the configured store.
    pub service: CommentService,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(service: CommentService, config: ServerConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::per_minute(config.rate_limit_per_min));
        Self {
            service,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}
