//! Data layer: durable artifact storage

pub mod objects;

pub use objects::{MemoryStore, ObjectStore, PutOptions, StoreError, open_store};
