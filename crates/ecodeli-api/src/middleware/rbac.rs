//! RBAC helpers for role-based route guarding.

use ecodeli_auth::RbacEnforcer;

use crate::error::ApiError;
use crate::extractors::AuthUser;

/// Checks that the authenticated user has the Admin role.
pub fn require_admin(auth: &AuthUser) -> Result<(), ApiError> {
    RbacEnforcer::new().require_admin(auth.role)?;
    Ok(())
}
