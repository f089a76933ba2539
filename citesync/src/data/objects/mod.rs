//! Object store layer
//!
//! The only durable state of the application lives here: one object per
//! artifact, addressed by key inside a bucket.
//!
//! ## Architecture
//!
//! - `store` - `ObjectStore` trait, `PutOptions`, key validation
//! - `s3` - AWS S3 / S3-compatible backend
//! - `filesystem` - local directory backend
//! - `memory` - in-process backend
//! - `error` - `StoreError`

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod s3;
pub mod store;

use std::sync::Arc;

use crate::core::config::{StorageBackend, StoreConfig};

pub use error::StoreError;
pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use s3::S3Store;
pub use store::{ObjectStore, PutOptions};

/// Create the configured object store backend
///
/// This function is async because S3 initialization loads AWS config.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StoreError::Config(
                    "S3 storage configured but no s3 config provided (missing bucket)".to_string(),
                )
            })?;

            Arc::new(
                S3Store::new(
                    s3_config.bucket.clone(),
                    s3_config.prefix.clone(),
                    s3_config.region.clone(),
                    s3_config.endpoint.clone(),
                )
                .await?,
            )
        }
        StorageBackend::Filesystem => {
            Arc::new(FilesystemStore::new(config.filesystem_path.clone()))
        }
    };

    tracing::debug!(backend = store.backend_name(), "Object store opened");

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_filesystem_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            backend: StorageBackend::Filesystem,
            s3: None,
            bucket: String::new(),
            filesystem_path: temp_dir.path().to_path_buf(),
        };

        let store = open_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "filesystem");

        store
            .put("k.csv", b"1\n", &PutOptions::default())
            .await
            .unwrap();
        assert_eq!(store.get("k.csv").await.unwrap(), b"1\n");
    }

    #[tokio::test]
    async fn test_open_s3_without_config_fails() {
        let config = StoreConfig {
            backend: StorageBackend::S3,
            s3: None,
            bucket: String::new(),
            filesystem_path: std::path::PathBuf::from("/unused"),
        };

        assert!(matches!(
            open_store(&config).await,
            Err(StoreError::Config(_))
        ));
    }
}
