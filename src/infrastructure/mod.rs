//! Adapters implementing the domain ports.

pub mod gateway;
pub mod in_memory;
pub mod mail;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::ports::{SharedCourseStore, SharedProgressStore, SharedUserStore};
use std::sync::Arc;

/// The three document stores the service runs against.
#[derive(Clone)]
pub struct Stores {
    pub courses: SharedCourseStore,
    pub users: SharedUserStore,
    pub progress: SharedProgressStore,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            courses: Arc::new(in_memory::InMemoryCourseStore::new()),
            users: Arc::new(in_memory::InMemoryUserStore::new()),
            progress: Arc::new(in_memory::InMemoryProgressStore::new()),
        }
    }

    #[cfg(feature = "storage-rocksdb")]
    pub fn rocksdb<P: AsRef<std::path::Path>>(path: P) -> crate::error::Result<Self> {
        let store = self::rocksdb::RocksDBStore::open(path)?;
        Ok(Self {
            courses: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            progress: Arc::new(store),
        })
    }
}
