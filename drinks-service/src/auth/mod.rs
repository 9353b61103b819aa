//! Bearer-token validation and the permission gate.

pub mod error;
pub mod keys;
pub mod permissions;
pub mod validator;

pub use error::AuthError;
pub use keys::{KeyCache, SigningKeys};
pub use permissions::check_permission;
pub use validator::{bearer_token, Audience, Claims, TokenValidator};
