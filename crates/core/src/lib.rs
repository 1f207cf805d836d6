//! Domain layer for Quill's threaded comments.
//!
//! Pure logic only: no database, no HTTP. The `db` and `api` crates build on
//! the types, validation rules, and the thread builder defined here.

pub mod actor;
pub mod comments;
pub mod error;
pub mod moderation;
pub mod roles;
pub mod thread;
pub mod types;
