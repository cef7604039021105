use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::http::Response;
use crate::store::CacheStore;

/// In-process `CacheStore`, for hosts without Cache Storage and for tests.
///
/// Buckets are kept in name order so `keys` is deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RefCell<BTreeMap<String, HashMap<String, Response>>>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every `put` from now on (quota exhausted, storage evicted).
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Synchronous insert, for seeding.
    pub fn insert(&self, cache_name: &str, url: &str, response: Response) {
        self.buckets
            .borrow_mut()
            .entry(cache_name.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    pub fn get(&self, cache_name: &str, url: &str) -> Option<Response> {
        self.buckets
            .borrow()
            .get(cache_name)
            .and_then(|bucket| bucket.get(url))
            .cloned()
    }

    /// Number of entries in a bucket, or None if it does not exist.
    pub fn len(&self, cache_name: &str) -> Option<usize> {
        self.buckets.borrow().get(cache_name).map(HashMap::len)
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets.borrow().keys().cloned().collect()
    }
}

#[async_trait(?Send)]
impl CacheStore for MemoryStore {
    async fn open(&self, cache_name: &str) -> Result<()> {
        self.buckets
            .borrow_mut()
            .entry(cache_name.to_string())
            .or_default();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.bucket_names())
    }

    async fn delete(&self, cache_name: &str) -> Result<bool> {
        Ok(self.buckets.borrow_mut().remove(cache_name).is_some())
    }

    async fn match_url(&self, cache_name: &str, url: &str) -> Result<Option<Response>> {
        Ok(self.get(cache_name, url))
    }

    async fn put(&self, cache_name: &str, url: &str, response: Response) -> Result<()> {
        if self.read_only.get() {
            return Err(CacheError::storage(format!("{} is read-only", cache_name)));
        }
        self.insert(cache_name, url, response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn put_then_match() {
        let store = MemoryStore::new();
        block_on(async {
            store.open("v1").await.unwrap();
            assert_eq!(store.match_url("v1", "/a").await.unwrap(), None);
            store.put("v1", "/a", Response::ok("A")).await.unwrap();
            assert_eq!(store.match_url("v1", "/a").await.unwrap(), Some(Response::ok("A")));
            // Buckets are isolated
            assert_eq!(store.match_url("v2", "/a").await.unwrap(), None);
        });
    }

    #[test]
    fn keys_and_delete() {
        let store = MemoryStore::new();
        store.insert("b", "/x", Response::ok(""));
        store.insert("a", "/x", Response::ok(""));
        block_on(async {
            assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
            assert!(store.delete("a").await.unwrap());
            assert!(!store.delete("a").await.unwrap());
            assert_eq!(store.keys().await.unwrap(), vec!["b"]);
        });
    }

    #[test]
    fn read_only_rejects_writes() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        let err = block_on(store.put("v1", "/a", Response::ok("A"))).unwrap_err();
        assert!(matches!(err, CacheError::Storage(_)));
        assert_eq!(store.get("v1", "/a"), None);
    }
}
