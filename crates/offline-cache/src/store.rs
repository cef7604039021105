//! Seams between the worker policy and its host environment.
//!
//! All three are `?Send`: in the browser every handle is a JS object pinned
//! to the worker thread.

use async_trait::async_trait;

use crate::error::Result;
use crate::http::{Request, Response};

/// Named buckets of URL -> response, as Cache Storage.
#[async_trait(?Send)]
pub trait CacheStore {
    /// Create the bucket if it does not exist.
    async fn open(&self, cache_name: &str) -> Result<()>;

    /// Names of every existing bucket.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Drop a whole bucket. Returns false if there was none.
    async fn delete(&self, cache_name: &str) -> Result<bool>;

    async fn match_url(&self, cache_name: &str, url: &str) -> Result<Option<Response>>;

    async fn put(&self, cache_name: &str, url: &str, response: Response) -> Result<()>;
}

#[async_trait(?Send)]
pub trait Network {
    /// Resolve with whatever the server answered, any status. Fails only
    /// when no response was obtained.
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Control over page clients, granted to the worker by its host.
#[async_trait(?Send)]
pub trait WorkerHost {
    /// Take over from a waiting predecessor without waiting for its pages
    /// to close.
    async fn skip_waiting(&self) -> Result<()>;

    /// Start controlling pages that are already open.
    async fn claim_clients(&self) -> Result<()>;
}
