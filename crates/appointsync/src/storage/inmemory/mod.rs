//! In-memory storage backend.
//!
//! Keeps every table in a `BTreeMap` behind `Arc<RwLock<_>>`. Used by the test
//! suites and by the development server when `STORE_BACKEND=memory`. Data is lost
//! when the store is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use appointsync::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::with_tables([("user-links", ProfileStore::key_schema())]);
//! ```

mod store;

pub use store::InMemoryStore;
