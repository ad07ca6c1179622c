//! User service: registration, sign-in and self-service profile.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::Deserialize;
use stayhub_common::{AppError, AppResult, IdGenerator};
use stayhub_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use validator::Validate;

use crate::services::notification::{NotificationService, dispatch_best_effort};

/// Input for creating a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    /// Guest or host; defaults to guest.
    pub role: Option<Role>,
}

/// Input for updating one's own profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSelfInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    pub role: Option<Role>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
    auto_approve: bool,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        notifications: NotificationService,
        auto_approve: bool,
    ) -> Self {
        Self {
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
            auto_approve,
        }
    }

    /// Create a new account and issue its token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let role = input.role.unwrap_or_default();
        if !matches!(role, Role::Guest | Role::Host) {
            return Err(AppError::Validation(
                "Role must be guest or host".to_string(),
            ));
        }

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(input.name.trim().to_string()),
            phone: Set(input.phone),
            role: Set(role),
            is_approved: Set(self.auto_approve),
            permissions: Set(None),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };
        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = %user.id, role = role.as_str(), "User registered");

        if !user.is_approved {
            dispatch_best_effort(
                "user_registered",
                self.notifications.notify_user_registered(&user.id, &user.email),
            )
            .await;
        }

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by email and password.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        // Accounts created before tokens existed get one on first sign-in
        if user.token.is_none() {
            return self.rotate_token(user).await;
        }

        Ok(user)
    }

    /// Sign out: the current token stops working.
    pub async fn sign_out(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;
        self.rotate_token(user).await?;
        Ok(())
    }

    async fn rotate_token(&self, user: user::Model) -> AppResult<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Update one's own profile.
    ///
    /// Role changes are limited to guest <-> host; staff cannot change their own role here.
    pub async fn update_self(
        &self,
        actor: &user::Model,
        input: UpdateSelfInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        if let Some(role) = input.role {
            if role != actor.role {
                if actor.role.is_staff() {
                    return Err(AppError::Forbidden(
                        "Staff roles cannot be changed from the profile".to_string(),
                    ));
                }
                if role.is_staff() {
                    return Err(AppError::Forbidden(
                        "Cannot grant yourself a staff role".to_string(),
                    ));
                }
            }
        }

        let mut active: user::ActiveModel = actor.clone().into();

        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone).filter(|p| !p.is_empty()));
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
