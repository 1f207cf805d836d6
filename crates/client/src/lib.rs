//! Client-side comment presenter.
//!
//! - [`api`] -- the [`CommentApi`] seam and its reqwest implementation.
//! - [`presenter`] -- [`ThreadPresenter`], which owns the rendered thread
//!   and the per-comment UI state around it.
//! - [`error`] -- [`ClientError`] and its user-facing messages.

pub mod api;
pub mod error;
pub mod model;
pub mod presenter;

pub use api::{CommentApi, HttpCommentApi};
pub use error::{ClientError, ClientResult};
pub use presenter::ThreadPresenter;
