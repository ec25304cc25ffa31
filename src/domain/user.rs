//! User identity records.
//!
//! A user is a single store entry under `user:<username>:key`. The value is
//! an Argon2id PHC hash of the client's secret; the secret itself doubles as
//! the bearer token the client presents on every request.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;

use crate::{
    error::{SyncError, SyncResult},
    storage::{KvStore, StoreKey},
};

#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    /// Stored credential: a PHC hash, or plaintext for records written before hashing.
    credential: String,
}

/// Result of a successful registration. `auth_key` is the registered
/// secret echoed back; there is no separate token issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUser {
    pub username: String,
    pub auth_key: String,
}

impl User {
    /// `user:<username>:key`
    pub fn key(username: &str) -> SyncResult<StoreKey> {
        validate_username(username)?;
        StoreKey::new(format!("user:{username}:key"))
            .map_err(|e| SyncError::InvalidUsername(e.to_string()))
    }

    /// Loads the stored credential. `NotFound` if the user never registered.
    #[tracing::instrument(level = "debug", skip(store))]
    pub fn load(store: &dyn KvStore, username: &str) -> SyncResult<User> {
        let credential = store.get(&Self::key(username)?)?;
        Ok(User {
            username: username.to_string(),
            credential,
        })
    }

    /// Registers `username`. Fails with `AlreadyExists` if any credential is
    /// already stored for it, regardless of the password given.
    #[tracing::instrument(level = "debug", skip(store, password, hasher))]
    pub fn create(
        store: &dyn KvStore,
        hasher: &CredentialHasher,
        username: &str,
        password: &str,
    ) -> SyncResult<CreatedUser> {
        let key = Self::key(username)?;
        match store.get(&key) {
            Ok(_) => return Err(SyncError::AlreadyExists(username.to_string())),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(SyncError::Storage(e)),
        }
        store.set(&key, &hasher.hash(password)?)?;
        tracing::info!(username, "registered user");
        Ok(CreatedUser {
            username: username.to_string(),
            auth_key: password.to_string(),
        })
    }

    /// True iff `candidate` is exactly the registered secret.
    ///
    /// Values that are not PHC hashes are compared as plaintext, except a
    /// JSON object or an empty value, which never authenticates.
    pub fn authenticate(&self, candidate: &str) -> bool {
        match PasswordHash::new(&self.credential) {
            Ok(hash) => Argon2::default()
                .verify_password(candidate.as_bytes(), &hash)
                .is_ok(),
            Err(_) if is_plaintext_credential(&self.credential) => self.credential == candidate,
            Err(_) => {
                tracing::warn!(username = %self.username, "stored credential is neither a hash nor a token");
                false
            }
        }
    }
}

/// Usernames are one `:`-free segment of every key they prefix.
pub(crate) fn validate_username(username: &str) -> SyncResult<()> {
    if username.is_empty() {
        return Err(SyncError::InvalidUsername("username is empty".into()));
    }
    if username.contains(':') {
        return Err(SyncError::InvalidUsername("username contains ':'".into()));
    }
    Ok(())
}

fn is_plaintext_credential(value: &str) -> bool {
    !value.is_empty() && !value.starts_with('{')
}

/// Argon2id hasher for new credentials. Verification reads the cost
/// parameters back out of each stored hash.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl CredentialHasher {
    pub fn with_params(params: Params) -> Self {
        CredentialHasher {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Minimum-cost parameters so tests don't spend seconds hashing.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self::with_params(Params::new(8, 1, 1, None).expect("valid argon2 params"))
    }

    pub fn hash(&self, secret: &str) -> SyncResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| SyncError::Credential(e.to_string()))
    }
}
