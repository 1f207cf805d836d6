use std::str::FromStr;

use quill_db::CommentPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres URL. When absent the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Depth, length and approval rules for new comments.
    pub comments: CommentPolicy,
    /// Comments and reports per user per minute; `0` disables the limit.
    pub rate_limit_per_min: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `DATABASE_URL`               | unset (in-memory store)    |
    /// | `COMMENT_MAX_DEPTH`          | `3`                        |
    /// | `COMMENT_MAX_LENGTH`         | `1000`                     |
    /// | `COMMENTS_REQUIRE_APPROVAL`  | `true`                     |
    /// | `COMMENT_RATE_LIMIT_PER_MIN` | `5`                        |
    ///
    /// See [`JwtConfig::from_env`] for the token settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let defaults = CommentPolicy::default();
        let comments = CommentPolicy {
            max_depth: env_or("COMMENT_MAX_DEPTH", defaults.max_depth),
            max_length: env_or("COMMENT_MAX_LENGTH", defaults.max_length),
            require_approval: env_or("COMMENTS_REQUIRE_APPROVAL", defaults.require_approval),
        };
        assert!(comments.max_depth >= 0, "COMMENT_MAX_DEPTH must not be negative");

        let rate_limit_per_min: u32 = env_or("COMMENT_RATE_LIMIT_PER_MIN", 5);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            jwt: JwtConfig::from_env(),
            comments,
            rate_limit_per_min,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw:?}")),
        Err(_) => default,
    }
}
