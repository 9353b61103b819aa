use super::error::AuthError;
use super::validator::Claims;

/// Permission strings guarding the drink routes.
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Confirms `required` is among the token's granted permissions (exact match).
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsMissingInClaims)?;

    if granted.iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}
