//! Object store trait definition
//!
//! Defines the interface for key/value object backends (S3, filesystem, memory)

use async_trait::async_trait;

use super::error::StoreError;

/// Per-object write options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// MIME type stored with the object
    pub content_type: Option<String>,
    /// Make the object world-readable (public-read ACL on S3)
    pub public_read: bool,
}

impl PutOptions {
    pub fn new(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            public_read: false,
        }
    }

    pub fn public_read(mut self) -> Self {
        self.public_read = true;
        self
    }
}

/// Trait for object store backends
///
/// There is no conditional put: the last writer wins. Callers that
/// read-modify-write an object rely on a single writer at a time.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Retrieve an object
    ///
    /// # Returns
    /// Object bytes, `NotFound` if the key does not exist, or `Transient` on
    /// network/service errors
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Store an object, replacing any previous content under `key`
    ///
    /// # Notes
    /// The object is either fully replaced or left untouched.
    async fn put(&self, key: &str, data: &[u8], options: &PutOptions) -> Result<(), StoreError>;
}

/// Validate an object key: non-empty, relative, no `.`/`..` segments
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
