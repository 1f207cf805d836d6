//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token generation and validation.
//!
//! Tokens are issued by the account service; this server only validates
//! them. [`jwt::issue_token`] exists for tests and local tooling.

pub mod jwt;
