//! In-memory object store
//!
//! Holds objects in a map for the lifetime of the process. Lets pipelines
//! run without a backend; failures can be injected for the next read or
//! write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::StoreError;
use super::store::{ObjectStore, PutOptions, validate_key};

/// A stored object with the options it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub options: PutOptions,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_next_get: AtomicBool,
    fail_next_put: AtomicBool,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without counting it as a put
    pub async fn insert(&self, key: &str, data: &[u8]) {
        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                options: PutOptions::default(),
            },
        );
    }

    /// Snapshot of a stored object
    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(key).cloned()
    }

    /// Make the next `get` fail with `Transient`
    pub fn fail_next_get(&self) {
        self.fail_next_get.store(true, Ordering::SeqCst);
    }

    /// Make the next `put` fail with `Transient`
    pub fn fail_next_put(&self) {
        self.fail_next_put.store(true, Ordering::SeqCst);
    }

    /// Number of successful puts so far
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        if self.fail_next_get.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Transient("injected get failure".to_string()));
        }
        self.objects
            .lock()
            .await
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, key: &str, data: &[u8], options: &PutOptions) -> Result<(), StoreError> {
        validate_key(key)?;
        if self.fail_next_put.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Transient("injected put failure".to_string()));
        }
        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                options: options.clone(),
            },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip_keeps_options() {
        let store = MemoryStore::new();
        let opts = PutOptions::new("image/png").public_read();
        store.put("chart.png", b"png", &opts).await.unwrap();

        assert_eq!(store.get("chart.png").await.unwrap(), b"png");
        assert_eq!(store.object("chart.png").await.unwrap().options, opts);
        assert_eq!(store.put_count(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("nope.csv").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failures_fire_once() {
        let store = MemoryStore::new();
        store.insert("a.csv", b"x\n").await;

        store.fail_next_get();
        assert!(matches!(store.get("a.csv").await, Err(StoreError::Transient(_))));
        assert!(store.get("a.csv").await.is_ok());

        store.fail_next_put();
        let opts = PutOptions::default();
        assert!(matches!(
            store.put("a.csv", b"y\n", &opts).await,
            Err(StoreError::Transient(_))
        ));
        assert_eq!(store.get("a.csv").await.unwrap(), b"x\n");
        assert_eq!(store.put_count(), 0);
    }
}
