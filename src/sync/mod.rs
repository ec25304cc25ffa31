use std::sync::Arc;

use crate::{
    domain::{Clock, CreatedUser, CredentialHasher, Progress, User},
    error::{SyncError, SyncResult},
    storage::KvStore,
};

/// The four sync operations, over an explicitly passed store handle.
/// Holds no state of its own beyond configuration.
#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    hasher: CredentialHasher,
    registration_enabled: bool,
}

impl SyncService {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        SyncService {
            store,
            clock,
            hasher: CredentialHasher::default(),
            registration_enabled: true,
        }
    }

    pub fn with_registration(mut self, enabled: bool) -> Self {
        self.registration_enabled = enabled;
        self
    }

    #[cfg(test)]
    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }

    #[tracing::instrument(level = "debug", skip(self, password))]
    pub fn create_user(&self, username: &str, password: &str) -> SyncResult<CreatedUser> {
        if !self.registration_enabled {
            return Err(SyncError::RegistrationDisabled);
        }
        User::create(self.store.as_ref(), &self.hasher, username, password)
    }

    /// Unknown users and wrong keys are both `Unauthorized`.
    #[tracing::instrument(level = "debug", skip(self, auth_key))]
    pub fn authenticate(&self, username: &str, auth_key: &str) -> SyncResult<User> {
        let user = match User::load(self.store.as_ref(), username) {
            Ok(user) => user,
            Err(SyncError::NotFound(_) | SyncError::InvalidUsername(_)) => {
                return Err(SyncError::Unauthorized);
            }
            Err(e) => return Err(e),
        };
        if user.authenticate(auth_key) {
            Ok(user)
        } else {
            tracing::debug!(username, "credential mismatch");
            Err(SyncError::Unauthorized)
        }
    }

    /// Returns the record as stored, stamped with server time.
    #[tracing::instrument(level = "debug", skip(self, progress), fields(document = %progress.document))]
    pub fn save_progress(&self, user: &User, mut progress: Progress) -> SyncResult<Progress> {
        progress.save(self.store.as_ref(), self.clock.as_ref(), &user.username)?;
        Ok(progress)
    }

    #[tracing::instrument(level = "debug", skip(self, user), fields(username = %user.username))]
    pub fn get_progress(&self, user: &User, document: &str) -> SyncResult<Progress> {
        Progress::load(self.store.as_ref(), &user.username, document)
    }
}
