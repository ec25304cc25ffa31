//! Per-document reading progress.
//!
//! A record lives under `user:<username>:document:<document>:record` as one
//! JSON value, replaced atomically on every save. Records written by the
//! older layout kept each field under `user:<username>:document:<document>`
//! plus a field suffix; those are still read when no JSON record exists.
//! Neither part may contain `:`, so the two layouts never share a key.

use serde::{Deserialize, Serialize};

use super::{clock::Clock, user::validate_username};
use crate::{
    error::{SyncError, SyncResult},
    storage::{KvStore, StoreKey},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub document: String,
    pub percentage: f64,
    pub progress: String,
    pub device: String,
    pub device_id: String,
    /// Server time of the last save, seconds since epoch.
    pub timestamp: i64,
}

/// Suffixes of the per-field key layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressField {
    Percent,
    Progress,
    Device,
    DeviceId,
    Timestamp,
}

impl ProgressField {
    #[cfg(test)]
    pub const ALL: [ProgressField; 5] = [
        ProgressField::Percent,
        ProgressField::Progress,
        ProgressField::Device,
        ProgressField::DeviceId,
        ProgressField::Timestamp,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            ProgressField::Percent => "_percent",
            ProgressField::Progress => "_progress",
            ProgressField::Device => "_device",
            ProgressField::DeviceId => "_device_id",
            ProgressField::Timestamp => "_timestamp",
        }
    }
}

const RECORD_SUFFIX: &str = ":record";

fn doc_prefix(username: &str, document: &str) -> SyncResult<String> {
    validate_username(username)?;
    if document.is_empty() || document.contains(':') {
        return Err(SyncError::InvalidDocument);
    }
    Ok(format!("user:{username}:document:{document}"))
}

fn to_key(raw: String) -> SyncResult<StoreKey> {
    StoreKey::new(raw).map_err(|e| {
        tracing::debug!(error = %e, "rejected document key");
        SyncError::InvalidDocument
    })
}

/// `user:<username>:document:<document>`
pub fn doc_key(username: &str, document: &str) -> SyncResult<StoreKey> {
    to_key(doc_prefix(username, document)?)
}

/// `user:<username>:document:<document>:record`, the JSON record.
pub fn record_key(username: &str, document: &str) -> SyncResult<StoreKey> {
    to_key(format!("{}{RECORD_SUFFIX}", doc_key(username, document)?))
}

/// `user:<username>:document:<document><suffix>`
pub fn field_key(username: &str, document: &str, field: ProgressField) -> SyncResult<StoreKey> {
    to_key(format!("{}{}", doc_key(username, document)?, field.suffix()))
}

impl Progress {
    /// Stamps the record with the current server time and writes it in one
    /// `set`. Any client-supplied timestamp is discarded. Returns the stamp.
    #[tracing::instrument(level = "debug", skip(self, store, clock), fields(document = %self.document))]
    pub fn save(
        &mut self,
        store: &dyn KvStore,
        clock: &dyn Clock,
        username: &str,
    ) -> SyncResult<i64> {
        let key = record_key(username, &self.document)?;
        self.timestamp = clock.now_secs();
        let record = serde_json::to_string(self).map_err(|e| SyncError::MalformedRecord {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        store.set(&key, &record)?;
        Ok(self.timestamp)
    }

    /// Reads the record for (`username`, `document`).
    ///
    /// `InvalidDocument` for an empty id or one containing `:`, before the
    /// store is touched.
    /// `NotFound` if neither the JSON record nor every legacy field exists.
    #[tracing::instrument(level = "debug", skip(store))]
    pub fn load(store: &dyn KvStore, username: &str, document: &str) -> SyncResult<Progress> {
        let key = record_key(username, document)?;
        match store.get(&key) {
            Ok(raw) => {
                let mut record: Progress =
                    serde_json::from_str(&raw).map_err(|e| SyncError::MalformedRecord {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
                record.document = document.to_string();
                Ok(record)
            }
            Err(e) if e.is_not_found() => Self::load_fields(store, username, document),
            Err(e) => Err(SyncError::Storage(e)),
        }
    }

    /// Older layout: one key per field. All five must exist; the first
    /// missing one is reported. An unreadable percentage counts as zero, an
    /// unreadable timestamp is a hard failure.
    fn load_fields(store: &dyn KvStore, username: &str, document: &str) -> SyncResult<Progress> {
        let get = |field: ProgressField| -> SyncResult<String> {
            Ok(store.get(&field_key(username, document, field)?)?)
        };

        let percentage = get(ProgressField::Percent)?.parse::<f64>().unwrap_or(0.0);
        let progress = get(ProgressField::Progress)?;
        let device = get(ProgressField::Device)?;
        let device_id = get(ProgressField::DeviceId)?;
        let raw_ts = get(ProgressField::Timestamp)?;
        let timestamp = raw_ts
            .parse::<i64>()
            .map_err(|e| SyncError::MalformedRecord {
                key: field_key(username, document, ProgressField::Timestamp)
                    .map(|k| k.to_string())
                    .unwrap_or_default(),
                reason: format!("timestamp {raw_ts:?}: {e}"),
            })?;

        tracing::debug!(document, "read progress from per-field layout");
        Ok(Progress {
            document: document.to_string(),
            percentage,
            progress,
            device,
            device_id,
            timestamp,
        })
    }
}
