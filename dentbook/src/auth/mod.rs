//! Authentication and authorization.
//!
//! - [`password`]: Argon2 hashing and verification
//! - [`session`]: signed bearer tokens carrying the user id and role
//! - [`current_user`]: the [`RequireRole`](current_user::RequireRole) extractor that gates routes by role

pub mod current_user;
pub mod password;
pub mod session;
