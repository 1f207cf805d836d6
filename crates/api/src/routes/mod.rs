pub mod comments;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /comments/...        see [`comments::router`]
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/comments", comments::router())
}
