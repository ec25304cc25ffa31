use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use super::{KvStore, StoreError, StoreKey, StoreResult};

/// Suffix for in-flight writes. Temp names start with '.', which no valid
/// [`StoreKey`] may, so they never shadow a key file.
const TEMP_SUFFIX: &str = "tmp";

/// Stores every key as one file directly under `root`.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    temp_counter: AtomicU64,
}

impl FileStore {
    /// Opens an existing directory as a store. The directory is never created here.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref();
        let meta = match fs::metadata(root) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::PathNotFound(root.to_path_buf()));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    key: root.display().to_string(),
                    source,
                });
            }
        };
        if !meta.is_dir() {
            return Err(StoreError::NotADirectory(root.to_path_buf()));
        }
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(FileStore {
            root: root.to_path_buf(),
            temp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    fn temp_path(&self, key: &StoreKey) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            ".{}.{}.{}.{}",
            key.as_str(),
            std::process::id(),
            n,
            TEMP_SUFFIX
        ))
    }

    fn write_atomic(&self, key: &StoreKey, value: &str) -> io::Result<()> {
        let temp = self.temp_path(key);
        let result = write_file(&temp, value.as_bytes())
            .and_then(|_| fs::rename(&temp, self.key_path(key)));
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl KvStore for FileStore {
    fn get(&self, key: &StoreKey) -> StoreResult<String> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(data) => Ok(data.trim().to_string()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(source) => {
                tracing::warn!(%key, error = %source, "failed to read key");
                Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    fn set(&self, key: &StoreKey, value: &str) -> StoreResult<()> {
        self.write_atomic(key, value).map_err(|source| {
            tracing::error!(%key, error = %source, "failed to set key");
            StoreError::Io {
                key: key.to_string(),
                source,
            }
        })
    }
}
