pub mod auth;

pub use auth::{authenticate, require_permission, AuthUser};
