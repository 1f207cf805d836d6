//! Well-known role name constants.
//!
//! These must match the `role` claim issued by the account service.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_READER: &str = "reader";

/// Roles allowed to moderate comments (approve, mark spam, edit or delete
/// other users' comments).
pub const ELEVATED_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR];

/// Whether `role` is one of [`ELEVATED_ROLES`].
pub fn is_elevated(role: &str) -> bool {
    ELEVATED_ROLES.contains(&role)
}
