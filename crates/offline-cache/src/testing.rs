//! Doubles for driving the worker without a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::error::{CacheError, Result};
use crate::http::{Request, Response};
use crate::memory::MemoryStore;
use crate::store::{CacheStore, Network, WorkerHost};

type Outcome = std::result::Result<Response, String>;

/// Answers from a script; unknown URLs behave as offline.
#[derive(Default)]
pub struct ScriptedNetwork {
    script: RefCell<HashMap<String, Outcome>>,
    held: RefCell<HashMap<String, oneshot::Receiver<Outcome>>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn respond(&self, url: &str, response: Response) {
        self.script.borrow_mut().insert(url.to_string(), Ok(response));
    }

    pub fn fail(&self, url: &str) {
        self.script
            .borrow_mut()
            .insert(url.to_string(), Err("connection refused".to_string()));
    }

    /// The next request for `url` stays pending until the sender fires.
    pub fn hold(&self, url: &str) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.held.borrow_mut().insert(url.to_string(), rx);
        tx
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.requests.borrow_mut().push(request.url.clone());

        let held = self.held.borrow_mut().remove(&request.url);
        let outcome = match held {
            Some(reply) => reply.await.unwrap_or_else(|_| Err("aborted".to_string())),
            None => self
                .script
                .borrow()
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| Err("offline".to_string())),
        };
        outcome.map_err(|message| CacheError::network(&request.url, message))
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub skipped: Cell<u32>,
    pub claimed: Cell<u32>,
    pub fail_claim: Cell<bool>,
}

#[async_trait(?Send)]
impl WorkerHost for RecordingHost {
    async fn skip_waiting(&self) -> Result<()> {
        self.skipped.set(self.skipped.get() + 1);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        if self.fail_claim.get() {
            return Err(CacheError::storage("clients unavailable"));
        }
        self.claimed.set(self.claimed.get() + 1);
        Ok(())
    }
}

/// A `MemoryStore` whose next lookup waits for a signal, so the network
/// side of a fetch can win the race.
#[derive(Default)]
pub struct GatedStore {
    pub inner: MemoryStore,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl GatedStore {
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl CacheStore for GatedStore {
    async fn open(&self, cache_name: &str) -> Result<()> {
        self.inner.open(cache_name).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys().await
    }

    async fn delete(&self, cache_name: &str) -> Result<bool> {
        self.inner.delete(cache_name).await
    }

    async fn match_url(&self, cache_name: &str, url: &str) -> Result<Option<Response>> {
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.match_url(cache_name, url).await
    }

    async fn put(&self, cache_name: &str, url: &str, response: Response) -> Result<()> {
        self.inner.put(cache_name, url, response).await
    }
}

/// A `MemoryStore` whose writes start failing after a fixed number of puts.
pub struct FlakyStore {
    pub inner: MemoryStore,
    puts_left: Cell<usize>,
}

impl FlakyStore {
    pub fn failing_after(puts: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            puts_left: Cell::new(puts),
        }
    }
}

#[async_trait(?Send)]
impl CacheStore for FlakyStore {
    async fn open(&self, cache_name: &str) -> Result<()> {
        self.inner.open(cache_name).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys().await
    }

    async fn delete(&self, cache_name: &str) -> Result<bool> {
        self.inner.delete(cache_name).await
    }

    async fn match_url(&self, cache_name: &str, url: &str) -> Result<Option<Response>> {
        self.inner.match_url(cache_name, url).await
    }

    async fn put(&self, cache_name: &str, url: &str, response: Response) -> Result<()> {
        let left = self.puts_left.get();
        if left == 0 {
            return Err(CacheError::storage("quota exceeded"));
        }
        self.puts_left.set(left - 1);
        self.inner.put(cache_name, url, response).await
    }
}
