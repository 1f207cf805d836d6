//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs where the API accepts input for it

pub mod article;
pub mod comment;
pub mod moderation_log;
pub mod report;
