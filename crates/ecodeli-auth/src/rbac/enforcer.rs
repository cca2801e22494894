//! RBAC enforcement logic — checks whether a role may perform an action.

use ecodeli_core::error::AppError;
use ecodeli_entity::user::UserRole;

/// Enforces role-based access control for marketplace operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Succeeds when `role` is one of `allowed`.
    pub fn require_any_role(&self, role: UserRole, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&role) {
            Ok(())
        } else {
            let names: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
            Err(AppError::authorization(format!(
                "Role '{role}' is not allowed; required one of: {}",
                names.join(", ")
            )))
        }
    }

    /// Succeeds only for administrators.
    pub fn require_admin(&self, role: UserRole) -> Result<(), AppError> {
        if role.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Administrator role required"))
        }
    }

    /// Succeeds for roles that may publish announcements.
    pub fn require_poster(&self, role: UserRole) -> Result<(), AppError> {
        if role.can_post_announcements() || role.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{role}' cannot publish announcements"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecodeli_core::error::ErrorKind;

    #[test]
    fn test_require_any_role() {
        let rbac = RbacEnforcer::new();
        assert!(
            rbac.require_any_role(UserRole::Deliverer, &[UserRole::Deliverer])
                .is_ok()
        );
        let err = rbac
            .require_any_role(UserRole::Client, &[UserRole::Deliverer, UserRole::Provider])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(err.message.contains("deliverer, provider"));
    }

    #[test]
    fn test_admin_and_poster_guards() {
        let rbac = RbacEnforcer::new();
        assert!(rbac.require_admin(UserRole::Admin).is_ok());
        assert!(rbac.require_admin(UserRole::Merchant).is_err());
        assert!(rbac.require_poster(UserRole::Merchant).is_ok());
        assert!(rbac.require_poster(UserRole::Deliverer).is_err());
    }
}
