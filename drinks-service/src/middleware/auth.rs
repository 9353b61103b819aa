use service_core::{
    axum::{
        async_trait,
        extract::{FromRequestParts, Request, State},
        http::request::Parts,
        middleware::Next,
        response::Response,
    },
    error::AppError,
};

use crate::auth::{bearer_token, check_permission, Claims};
use crate::AppState;

/// Validates the bearer token and stores its claims in request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;
    let claims = state.validator.validate(token).await?;

    tracing::debug!(sub = ?claims.sub, "Bearer token accepted");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Rejects the request unless the authenticated claims grant `permission`.
/// Must run after [`authenticate`].
pub async fn require_permission(
    permission: &'static str,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req.extensions().get::<Claims>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!(
            "Claims missing from request extensions"
        ))
    })?;

    if let Err(e) = check_permission(claims, permission) {
        tracing::warn!(
            sub = ?claims.sub,
            required_permission = %permission,
            granted = ?claims.permissions,
            "Insufficient permissions"
        );
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

/// Extractor for handlers that want the caller's claims.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<Claims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Auth claims missing from request extensions"
            ))
        })?;

        Ok(AuthUser(claims.clone()))
    }
}
