//! Credential store for the login route
//!
//! Accounts come from the config file. Each one holds either a plaintext
//! password (the legacy default account) or an argon2 PHC hash.

use std::collections::HashMap;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::config::UserConfig;

/// Anything that can check a username/password pair
pub trait CredentialStore: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("User {0} has neither password nor password_hash")]
    MissingSecret(String),

    #[error("User {0} has an invalid password hash")]
    InvalidHash(String),

    #[error("Password hashing failed: {0}")]
    HashError(String),
}

#[derive(Debug, Clone)]
enum StoredSecret {
    Plain(String),
    Hashed(String),
}

/// In-memory username -> secret map
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: HashMap<String, StoredSecret>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from configured accounts
    ///
    /// A `password_hash` wins over a plaintext `password` when both are set.
    pub fn from_config(users: &[UserConfig]) -> Result<Self, CredentialError> {
        let mut store = Self::new();
        for user in users {
            match (&user.password_hash, &user.password) {
                (Some(hash), _) => store.insert_hash(&user.username, hash)?,
                (None, Some(password)) => store.insert_plain(&user.username, password),
                (None, None) => return Err(CredentialError::MissingSecret(user.username.clone())),
            }
        }
        Ok(store)
    }

    /// Add or replace an account with a plaintext password
    pub fn insert_plain(&mut self, username: &str, password: &str) {
        self.users
            .insert(username.to_string(), StoredSecret::Plain(password.to_string()));
    }

    /// Add or replace an account with an argon2 PHC hash
    pub fn insert_hash(&mut self, username: &str, hash: &str) -> Result<(), CredentialError> {
        PasswordHash::new(hash).map_err(|_| CredentialError::InvalidHash(username.to_string()))?;
        self.users
            .insert(username.to_string(), StoredSecret::Hashed(hash.to_string()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for UserStore {
    fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(StoredSecret::Plain(expected)) => expected == password,
            Some(StoredSecret::Hashed(hash)) => match PasswordHash::new(hash) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            },
            None => false,
        }
    }
}

/// Hash a password into an argon2 PHC string suitable for `password_hash`
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::HashError(e.to_string()))
}
