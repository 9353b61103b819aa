//! Bearer-token extraction and verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use service_core::axum::http::{header, HeaderMap};

use super::error::AuthError;
use super::keys::KeyCache;

/// `aud` may be a single string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Verified token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub iss: Option<String>,
    pub aud: Option<Audience>,
    pub exp: i64,
    pub iat: Option<i64>,
    /// Granted permission strings. `None` when the issuer did not include
    /// the claim at all, which the permission gate treats differently from
    /// an empty list.
    pub permissions: Option<Vec<String>>,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::AuthHeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::AuthHeaderMalformed("Authorization header is not valid text."))?;

    let parts: Vec<&str> = value.split(' ').collect();

    if parts[0] != "Bearer" {
        return Err(AuthError::AuthHeaderMalformed(
            "Authorization header must start with \"Bearer\".",
        ));
    }
    if parts.len() == 1 || parts[1].is_empty() {
        return Err(AuthError::AuthHeaderMalformed("Token not found."));
    }
    if parts.len() > 2 {
        return Err(AuthError::AuthHeaderMalformed(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(parts[1])
}

/// Verifies tokens against the cached signing keys and the expected
/// audience and issuer.
pub struct TokenValidator {
    keys: KeyCache,
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
}

impl TokenValidator {
    pub fn new(
        keys: KeyCache,
        audience: impl Into<String>,
        issuer: impl Into<String>,
        algorithms: Vec<Algorithm>,
    ) -> Self {
        Self {
            keys,
            audience: audience.into(),
            issuer: issuer.into(),
            algorithms,
        }
    }

    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let unverified = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Token header undecodable");
            AuthError::InvalidToken
        })?;

        let kid = unverified.kid.ok_or(AuthError::InvalidHeaderClaim)?;

        let keys = self.keys.current().await;
        let key = keys.get(&kid).ok_or_else(|| {
            tracing::debug!(kid = %kid, "No signing key for kid");
            AuthError::InvalidKeyId
        })?;

        if !self.algorithms.contains(&unverified.alg) {
            tracing::debug!(alg = ?unverified.alg, "Token signed with a disallowed algorithm");
            return Err(AuthError::InvalidToken);
        }

        let mut validation = Validation::new(unverified.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
            _ => {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::InvalidToken
            }
        })?;

        Ok(data.claims)
    }
}
