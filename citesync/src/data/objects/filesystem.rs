//! Filesystem-based object store
//!
//! Maps each key onto a path under a base directory:
//! `{base_path}/{key}`. Writes go through a staging file in the destination
//! directory and are renamed into place, so readers never observe a partial
//! object.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StoreError;
use super::store::{ObjectStore, PutOptions, validate_key};

/// Filesystem-based object store
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    /// Directory holding all objects
    base_path: PathBuf,
}

impl FilesystemStore {
    pub fn new(base_path: PathBuf) -> Self {
        tracing::debug!(path = %base_path.display(), "Filesystem store initialized");
        Self { base_path }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    /// Staging file next to the destination; PID + nanos keep names unique
    fn staging_path(dest: &Path) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos();
        let mut name = dest
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.{}.tmp", std::process::id(), nanos));
        dest.with_file_name(name)
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        let path = self.object_path(key);

        // Read directly and map ENOENT, rather than racing an exists() check
        fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StoreError::Io(e)
            }
        })
    }

    async fn put(&self, key: &str, data: &[u8], options: &PutOptions) -> Result<(), StoreError> {
        validate_key(key)?;
        let dest = self.object_path(key);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let staging = Self::staging_path(&dest);
        if let Err(e) = fs::write(&staging, data).await {
            fs::remove_file(&staging).await.ok();
            return Err(StoreError::Io(e));
        }
        if let Err(e) = fs::rename(&staging, &dest).await {
            fs::remove_file(&staging).await.ok();
            return Err(StoreError::Io(e));
        }

        tracing::debug!(
            key,
            size = data.len(),
            content_type = ?options.content_type,
            path = %dest.display(),
            "Object stored"
        );

        Ok(())
    }
}
