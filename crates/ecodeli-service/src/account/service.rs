//! Self-service account operations: registration, login, profile.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ecodeli_auth::jwt::AccessToken;
use ecodeli_auth::{JwtEncoder, PasswordHasher, PasswordValidator};
use ecodeli_core::error::AppError;
use ecodeli_core::result::AppResult;
use ecodeli_database::repositories::UserRepository;
use ecodeli_entity::user::{CreateUser, User, UserRole, ValidationStatus};

use crate::context::RequestContext;

/// Self-registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// Issued on a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: AccessToken,
    pub user: User,
}

/// Status a freshly registered account starts in.
pub fn initial_validation(role: UserRole) -> ValidationStatus {
    if role.requires_validation() {
        ValidationStatus::Pending
    } else {
        ValidationStatus::Approved
    }
}

/// Registration, login and profile.
#[derive(Debug, Clone)]
pub struct AccountService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            validator,
            encoder,
        }
    }

    /// Registers a new account. Admins cannot self-register.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<User> {
        if !req.role.is_self_registrable() {
            return Err(AppError::authorization(format!(
                "Role '{}' cannot self-register",
                req.role
            )));
        }
        let email = req.email.trim().to_lowercase();
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Name cannot be empty"));
        }
        self.validator.validate(&req.password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(format!("Email '{email}' is already registered")));
        }

        let password_hash = self.hasher.hash_password(&req.password)?;
        let user = self
            .user_repo
            .create(&CreateUser {
                email,
                password_hash,
                name: req.name.trim().to_string(),
                role: req.role,
                validation_status: initial_validation(req.role),
            })
            .await?;

        info!(
            user_id = %user.id,
            role = %user.role,
            status = %user.validation_status,
            "Account registered"
        );
        Ok(user)
    }

    /// Checks credentials and issues an access token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            warn!(%email, "Login for unknown email");
            return Err(AppError::authentication("Invalid email or password"));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(AppError::authentication("Invalid email or password"));
        }
        if user.validation_status == ValidationStatus::Rejected {
            return Err(AppError::authorization(
                "Account was rejected by an administrator",
            ));
        }

        let token = self
            .encoder
            .generate_access_token(user.id, user.role, &user.email)?;
        info!(user_id = %user.id, "Login succeeded");
        Ok(LoginResponse { token, user })
    }

    /// The caller's account.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account no longer exists"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workers_start_pending() {
        assert_eq!(initial_validation(UserRole::Deliverer), ValidationStatus::Pending);
        assert_eq!(initial_validation(UserRole::Provider), ValidationStatus::Pending);
        assert_eq!(initial_validation(UserRole::Client), ValidationStatus::Approved);
        assert_eq!(initial_validation(UserRole::Merchant), ValidationStatus::Approved);
    }
}
