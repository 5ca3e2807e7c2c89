//! Directory-backed Key-Value store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{CacheError, KeyValueStore};

/// Key-Value store that keeps one file per key under a root directory.
///
/// Keys are base64url-encoded into file names, so any key string is safe to
/// use. Writes go to a temporary sibling file which is synced to disk and
/// then renamed over the target, so readers see either the previous value or
/// the new one.
///
/// # Example
///
/// ```rust,ignore
/// let store = FileStore::open(".turbo-cart").await?;
/// store.set("turbo:cart", payload).await?;
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| CacheError::OpenError(format!("{}: {}", root.display(), e)))?;
        debug!(root = %root.display(), "FileStore::open");
        Ok(Self { root })
    }

    /// Directory holding the store's files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.json", URL_SAFE_NO_PAD.encode(key.as_bytes())))
    }
}

async fn write_synced(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(value).await?;
    file.sync_all().await
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::StoreError(format!(
                "read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("{:016x}.tmp", rand::random::<u64>()));

        if let Err(e) = write_synced(&tmp, value.as_bytes()).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::StoreError(format!(
                "write {}: {}",
                tmp.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&tmp, &path).await {
            // Best effort: don't leave the temp file behind.
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::StoreError(format!(
                "rename {}: {}",
                path.display(),
                e
            )));
        }

        debug!(key, path = %path.display(), bytes = value.len(), "FileStore::set");
        Ok(())
    }
}
