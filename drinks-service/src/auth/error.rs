use service_core::axum::http::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

/// Reasons a request fails the bearer-token or permission checks.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    AuthHeaderMissing,

    #[error("{0}")]
    AuthHeaderMalformed(&'static str),

    #[error("Authorization malformed.")]
    InvalidHeaderClaim,

    #[error("Unable to find the appropriate key.")]
    InvalidKeyId,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Unable to parse authentication token.")]
    InvalidToken,

    #[error("Permissions not included in JWT.")]
    PermissionsMissingInClaims,

    #[error("Permission not found.")]
    Unauthorized,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::AuthHeaderMissing
            | AuthError::AuthHeaderMalformed(_)
            | AuthError::InvalidHeaderClaim
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::InvalidKeyId
            | AuthError::InvalidToken
            | AuthError::PermissionsMissingInClaims => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized => StatusCode::FORBIDDEN,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AuthHeaderMissing => "authorization_header_missing",
            AuthError::AuthHeaderMalformed(_)
            | AuthError::InvalidHeaderClaim
            | AuthError::InvalidKeyId
            | AuthError::InvalidToken => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissingInClaims => "invalid_claims",
            AuthError::Unauthorized => "unauthorized",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth {
            status: err.status(),
            code: err.code(),
            description: err.to_string(),
        }
    }
}
