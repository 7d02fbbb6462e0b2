//! Authentication and user account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserClaims, UserFilter, UserStatus},
    repository::Repository,
    validation::is_strong_password,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username/password and return a JWT plus the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if user.status == UserStatus::Inactive {
            return Err(AppError::Authentication("Account is inactive".to_string()));
        }

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        self.repository.users.update_last_login(user.user_id).await?;

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.user_id,
            role: user.role,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Register a new user account
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if !is_strong_password(&user.password) {
            return Err(AppError::Validation(
                "Password must be longer than 8 characters and mix upper case, \
                 lower case, digits and special characters"
                    .to_string(),
            ));
        }

        if self.repository.users.username_exists(&user.username).await? {
            return Err(AppError::Conflict(format!(
                "Username {} already exists",
                user.username
            )));
        }

        if self.repository.users.email_exists(&user.email).await? {
            return Err(AppError::Conflict(format!("Email {} already exists", user.email)));
        }

        let password_hash = self.hash_password(&user.password)?;
        let role = user.role.unwrap_or(Role::Customer);
        let status = user.status.unwrap_or(UserStatus::Active);

        self.repository
            .users
            .create(&user, &password_hash, role, status)
            .await
    }

    /// Partially update a user account
    pub async fn update_user(&self, id: Uuid, update: UpdateUser) -> AppResult<User> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.users.update(id, &update).await
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.get_all().await
    }

    pub async fn find_users(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        self.repository.users.find(filter).await
    }

    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repository.users.delete(id).await
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
