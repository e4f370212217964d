//! Authentication manager implementation.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::db::GameStore;
use crate::game::models::UserId;

use super::errors::{AuthError, AuthResult};
use super::models::{AccessTokenClaims, LoginRequest, NewUser, RegisterRequest, User};

/// Authentication manager: registration, login, and JWT issuance.
#[derive(Clone)]
pub struct AuthManager {
    store: Arc<dyn GameStore>,
    pepper: String,
    jwt_secret: String,
    access_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager.
    ///
    /// `pepper` is a server-side secret appended to passwords before
    /// hashing; `jwt_secret` signs access tokens.
    pub fn new(store: Arc<dyn GameStore>, pepper: String, jwt_secret: String) -> Self {
        Self {
            store,
            pepper,
            jwt_secret,
            access_token_duration: Duration::hours(24),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// * `AuthError::UsernameTaken` - Username already exists
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::InvalidUsername` - Username format invalid
    /// * `AuthError::WeakPassword` - Password too weak
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        self.validate_username(&request.username)?;
        self.validate_password(&request.password)?;

        if self
            .store
            .get_user_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }
        if self
            .store
            .get_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: request.username,
                password_hash,
                email: request.email,
                full_name: request.full_name,
                avatar_url: request.avatar_url,
            })
            .await?;

        Ok(user)
    }

    /// Log a user in, returning the user and a signed access token.
    ///
    /// Unknown usernames and wrong passwords both map to
    /// `InvalidCredentials`; login responses must not reveal which.
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, String)> {
        let credentials = self
            .store
            .get_credentials(&request.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.verify_password(&request.password, &credentials.password_hash)?;

        let user = self
            .store
            .get_user(credentials.user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.generate_access_token(user.id, &user.username)?;
        Ok((user, token))
    }

    /// Decode and validate an access token.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Hash password with Argon2id + pepper.
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    fn generate_access_token(&self, user_id: UserId, username: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id,
            username: username.to_string(),
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    fn validate_username(&self, username: &str) -> AuthResult<()> {
        let len = username.len();
        if !(3..=20).contains(&len) {
            return Err(AuthError::InvalidUsername(
                "Username must be 3-20 characters".to_string(),
            ));
        }

        if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(AuthError::InvalidUsername(
                "Username can only contain letters, numbers, and underscores".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_password(&self, password: &str) -> AuthResult<()> {
        if password.len() < 8 {
            return Err(AuthError::WeakPassword(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
        let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());

        if !has_digit || !has_uppercase || !has_lowercase {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one number, one uppercase and one lowercase letter"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
