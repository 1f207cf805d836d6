//! Persistence layer for Quill comments.
//!
//! - [`models`] -- row structs and request DTOs.
//! - [`repositories`] -- zero-sized Postgres repositories.
//! - [`store`] -- the [`CommentStore`] persistence contract and its
//!   Postgres implementation.
//! - [`memory`] -- an in-process [`CommentStore`] for tests and local runs.
//! - [`service`] -- [`CommentService`], which applies validation,
//!   permissions and moderation rules on top of any store.

use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod models;
pub mod repositories;
pub mod service;
pub mod store;

pub use memory::MemoryCommentStore;
pub use service::{CommentPolicy, CommentService};
pub use store::{CommentStore, PgCommentStore, StoreError, StoreResult};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
