// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Authentication
//!
//! Sign-up, sign-in and sign-out behind the [`AuthProvider`] trait. Two
//! providers exist:
//!
//! - [`LocalAuthProvider`]: accounts kept in the key-value store with bcrypt
//!   password hashes; sessions are HS256 JWTs
//! - [`MockAuthProvider`]: the unconfigured fallback that accepts any
//!   credentials and derives a stable user id from the email
//!
//! [`describe_auth_error`] turns raw provider errors into the messages shown
//! to users.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AuthMode, AuthSettings};
use crate::constants::auth;
use crate::database::{load_json, save_json, KeyValueStore, StorageError, StorageKey, StorageKind};
use crate::logging::AppLogger;

const MIN_PASSWORD_LENGTH: usize = 8;

const RATE_LIMIT_PHRASES: [&str; 3] = ["over_email_send_rate_limit", "rate limit", "50 seconds"];
const UNCONFIRMED_PHRASES: [&str; 2] = ["email_not_confirmed", "Email not confirmed"];

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least 8 characters long")]
    WeakPassword,

    #[error("User already registered")]
    AlreadyRegistered,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("JWT_SECRET is required for local authentication")]
    MissingSecret,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A signed-in (or just registered) user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    /// `None` when sign-up does not start a session
    pub access_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Sign-in boundary
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;
}

/// Map a raw provider error to the message shown to the user
pub fn describe_auth_error(message: &str) -> String {
    if RATE_LIMIT_PHRASES.iter().any(|p| message.contains(p)) {
        "Too many requests. Please wait 50 seconds before trying again for security purposes.".to_string()
    } else if UNCONFIRMED_PHRASES.iter().any(|p| message.contains(p)) {
        "Please check your email and click the confirmation link before signing in. Check your spam folder if you don't see it.".to_string()
    } else {
        message.to_string()
    }
}

/// `user_` followed by the first alphanumeric characters of base64(email)
pub fn mock_user_id(email: &str) -> String {
    let encoded: String = STANDARD
        .encode(email)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(auth::MOCK_USER_ID_LEN)
        .collect();
    format!("{}{}", auth::MOCK_USER_PREFIX, encoded)
}

/// Accepts any credentials. Sign-up does not open a session.
#[derive(Debug, Clone, Default)]
pub struct MockAuthProvider;

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        AppLogger::log_auth_event(email, "mock_sign_up", true, None);
        Ok(AuthSession {
            user_id: mock_user_id(email),
            email: email.to_string(),
            access_token: None,
            expires_at: None,
        })
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        AppLogger::log_auth_event(email, "mock_sign_in", true, None);
        Ok(AuthSession {
            user_id: mock_user_id(email),
            email: email.to_string(),
            access_token: Some(auth::MOCK_ACCESS_TOKEN.to_string()),
            expires_at: None,
        })
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        AppLogger::log_auth_event(&session.email, "mock_sign_out", true, None);
        Ok(())
    }
}

/// JWT claims of a local session
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Stored credentials of a local account
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    user_id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

/// Accounts in the key-value store, sessions as signed JWTs
pub struct LocalAuthProvider<S> {
    store: S,
    jwt_secret: Vec<u8>,
    token_expiry_hours: i64,
    hash_cost: u32,
}

impl<S: KeyValueStore> LocalAuthProvider<S> {
    pub fn new(store: S, jwt_secret: Vec<u8>, token_expiry_hours: i64) -> Self {
        Self {
            store,
            jwt_secret,
            token_expiry_hours,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn account_key(email: &str) -> StorageKey {
        StorageKey::new(StorageKind::Account, email.trim().to_lowercase())
    }

    /// Issue a session token for an account
    fn create_session(&self, account: &Account) -> Result<AuthSession, AuthError> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: account.user_id.clone(),
            email: account.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.jwt_secret),
        )?;

        Ok(AuthSession {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
            access_token: Some(token),
            expires_at: Some(expires_at),
        })
    }

    /// Validate a session token and extract its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.jwt_secret),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.len() <= 5 {
        return false;
    }

    let Some(at_pos) = email.find('@') else {
        return false;
    };

    if at_pos == 0 || at_pos == email.len() - 1 {
        return false;
    }

    email[at_pos + 1..].contains('.')
}

#[async_trait]
impl<S: KeyValueStore> AuthProvider for LocalAuthProvider<S> {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }

        let key = Self::account_key(email);
        if load_json::<S, Account>(&self.store, &key).await?.is_some() {
            AppLogger::log_auth_event(email, "sign_up", false, Some("already registered"));
            return Err(AuthError::AlreadyRegistered);
        }

        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: bcrypt::hash(password, self.hash_cost)?,
            created_at: Utc::now(),
        };
        save_json(&self.store, &key, &account).await?;

        AppLogger::log_auth_event(email, "sign_up", true, None);
        self.create_session(&account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        let account: Account = match load_json(&self.store, &Self::account_key(email)).await? {
            Some(account) => account,
            None => {
                AppLogger::log_auth_event(email, "sign_in", false, Some("unknown account"));
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !bcrypt::verify(password, &account.password_hash)? {
            AppLogger::log_auth_event(email, "sign_in", false, Some("wrong password"));
            return Err(AuthError::InvalidCredentials);
        }

        AppLogger::log_auth_event(email, "sign_in", true, None);
        self.create_session(&account)
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        // Sessions are stateless tokens; nothing is revoked server-side
        AppLogger::log_auth_event(&session.email, "sign_out", true, None);
        Ok(())
    }
}

/// Provider selected by the auth settings
pub fn build_provider<S>(settings: &AuthSettings, store: S) -> Result<Box<dyn AuthProvider>, AuthError>
where
    S: KeyValueStore + 'static,
{
    match settings.mode {
        AuthMode::Mock => Ok(Box::new(MockAuthProvider)),
        AuthMode::Local => {
            let secret = settings.jwt_secret.as_ref().ok_or(AuthError::MissingSecret)?;
            Ok(Box::new(LocalAuthProvider::new(
                store,
                secret.as_bytes().to_vec(),
                settings.jwt_expiry_hours,
            )))
        }
    }
}
