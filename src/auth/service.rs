//! Credential Service
//! Mission: Register users with hashed passwords and exchange credentials for tokens

use crate::auth::{
    jwt::{IssuedToken, JwtHandler, TokenError},
    models::{SessionClaims, User, UserRole, MIN_PASSWORD_LEN},
    user_store::UserStore,
};
use crate::db::StoreError;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Plaintext behind the hash compared against when the email is unknown
const DUMMY_PASSWORD: &str = "bookshelf-no-such-account";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{0}")]
    Validation(String),
    #[error("User with given email or username already exists")]
    Conflict,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for CredentialError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => CredentialError::Conflict,
            StoreError::Other(e) => CredentialError::Internal(e),
        }
    }
}

/// Registration and login on top of the user store and token issuer
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<UserStore>,
    jwt: Arc<JwtHandler>,
    bcrypt_cost: u32,
    // Hashed at `bcrypt_cost` on the first unknown-email login
    dummy_hash: Arc<OnceCell<String>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl CredentialService {
    pub fn new(store: Arc<UserStore>, jwt: Arc<JwtHandler>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            jwt,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    /// Create a `user` account. Username is trimmed, email trimmed and lower-cased.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CredentialError> {
        self.create_account(username, email, password, UserRole::User)
            .await
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, CredentialError> {
        let username = username.trim();
        let email = normalize_email(email);

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(CredentialError::Validation(
                "Missing required fields".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredentialError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self
            .store
            .find_by_email_or_username(&email, username)
            .await?
            .is_some()
        {
            warn!("Registration rejected, duplicate account: {}", username);
            return Err(CredentialError::Conflict);
        }

        let password_hash = self.hash_password(password).await?;
        let now = Utc::now().to_rfc3339();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email,
            password_hash,
            role,
            created_at: now.clone(),
            updated_at: now,
        };

        // The pre-check above races with concurrent registrations; the
        // UNIQUE constraints settle it and surface as Conflict.
        self.store.insert(&user).await?;

        Ok(user)
    }

    /// Check credentials and issue a 1h session token
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, IssuedToken), CredentialError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_by_email(&email).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
                .await?;
            self.verify_password(password, dummy).await?;
            warn!("❌ Failed login attempt (unknown email): {}", email);
            return Err(CredentialError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            warn!("❌ Failed login attempt: {}", email);
            return Err(CredentialError::InvalidCredentials);
        }

        let token = self.jwt.issue(&SessionClaims {
            user_id: user.id,
            role: user.role,
        })?;

        info!(
            "✅ Login successful: {} ({})",
            user.username,
            user.role.as_str()
        );

        Ok((user, token))
    }

    /// Create the configured admin account unless an admin already exists
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, CredentialError> {
        if self.store.count_admins().await? > 0 {
            return Ok(None);
        }

        let admin = self
            .create_account(username, email, password, UserRole::Admin)
            .await?;
        info!("🔐 Admin user seeded: {}", admin.username);
        Ok(Some(admin))
    }

    async fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("Password hashing task failed")?
            .context("Failed to hash password")?;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("Password verification task failed")?
            .context("Failed to verify password")?;
        Ok(valid)
    }
}
