//! App shell worker: lifecycle state machine and the fetch policy.
//!
//! ```text
//! Installing --install--> Activating --activate--> Active
//!     |  \                      \                   ^
//!     |   +--- failure --------+--> Redundant      |
//!     +------------------ resume ------------------+
//! ```
//!
//! Browsers stop idle workers and evaluate the script again for the next
//! event, without repeating install or activate. A worker rebuilt that way
//! starts in `Installing` and is moved straight to `Active` by `resume`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use futures::future::{self, Either, FutureExt, LocalBoxFuture};

use crate::error::{CacheError, Result};
use crate::http::{Request, Response};
use crate::manifest::{origin, ShellManifest};
use crate::store::{CacheStore, Network, WorkerHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Filling the shell bucket.
    Installing,
    /// Installed; stale buckets not yet collected.
    Activating,
    /// Controlling pages and answering fetches.
    Active,
    /// A lifecycle step failed; this instance will never serve.
    Redundant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Network,
}

/// A response chosen for an intercepted request.
pub struct Served {
    pub response: Response,
    pub source: Source,
    /// Present when a cached copy was served while the network request is
    /// still in flight. The host drives it to completion in the background;
    /// it refreshes the cache and never fails.
    pub revalidation: Option<LocalBoxFuture<'static, ()>>,
}

impl fmt::Debug for Served {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Served")
            .field("status", &self.response.status)
            .field("source", &self.source)
            .field("revalidating", &self.revalidation.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub enum FetchDecision {
    /// Not ours: let the request reach the network untouched.
    Passthrough,
    Respond(Served),
}

pub struct OfflineWorker<S, N, H> {
    manifest: ShellManifest,
    scope: String,
    asset_urls: Vec<String>,
    store: Rc<S>,
    network: Rc<N>,
    host: H,
    state: Cell<WorkerState>,
}

impl<S, N, H> OfflineWorker<S, N, H>
where
    S: CacheStore + 'static,
    N: Network + 'static,
    H: WorkerHost,
{
    pub fn new(
        manifest: ShellManifest,
        scope: &str,
        store: Rc<S>,
        network: Rc<N>,
        host: H,
    ) -> Result<Self> {
        manifest.validate()?;
        let asset_urls = manifest.asset_urls(scope);
        // Only same-origin requests are intercepted, so a foreign asset could
        // be cached but never served
        if let Some(url) = asset_urls.iter().find(|url| origin(url) != origin(scope)) {
            return Err(CacheError::ForeignAsset { url: url.clone() });
        }
        Ok(Self {
            asset_urls,
            scope: scope.to_string(),
            manifest,
            store,
            network,
            host,
            state: Cell::new(WorkerState::Installing),
        })
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    pub fn cache_name(&self) -> &str {
        &self.manifest.cache_name
    }

    /// URL the worker was registered for.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Resolved URLs of the app shell.
    pub fn asset_urls(&self) -> &[String] {
        &self.asset_urls
    }

    fn expect_state(&self, expected: WorkerState, operation: &'static str) -> Result<()> {
        let state = self.state.get();
        if state != expected {
            return Err(CacheError::InvalidTransition { operation, state });
        }
        Ok(())
    }

    fn settle<T>(&self, result: Result<T>, next: WorkerState, operation: &str) -> Result<T> {
        match result {
            Ok(value) => {
                log::info!("offline-cache: {} done, now {:?}", operation, next);
                self.state.set(next);
                Ok(value)
            }
            Err(e) => {
                log::error!("offline-cache: {} failed: {}", operation, e);
                self.state.set(WorkerState::Redundant);
                Err(e)
            }
        }
    }

    /// Fetch the whole shell, then store it and take over immediately.
    ///
    /// Every asset must answer with a success status. On any failure the
    /// bucket this install created is deleted again and the worker becomes
    /// `Redundant`.
    pub async fn install(&self) -> Result<()> {
        self.expect_state(WorkerState::Installing, "install")?;
        let result = self.install_shell().await;
        self.settle(result, WorkerState::Activating, "install")
    }

    async fn install_shell(&self) -> Result<()> {
        let cache_name = self.cache_name();
        let existed = self.store.keys().await?.iter().any(|name| name == cache_name);
        self.store.open(cache_name).await?;

        let result = self.populate().await;
        if result.is_err() {
            if existed {
                // Shared with the running version; entries already rewritten stay
                log::warn!("offline-cache: install into existing {} failed part-way", cache_name);
            } else if let Err(e) = self.store.delete(cache_name).await {
                log::warn!("offline-cache: could not roll back {}: {}", cache_name, e);
            }
        }
        result
    }

    async fn populate(&self) -> Result<()> {
        let cache_name = self.cache_name();

        let fetches = self.asset_urls.iter().map(|url| {
            let request = Request::get(url.clone());
            async move {
                let response = self.network.fetch(&request).await?;
                if !response.is_success() {
                    return Err(CacheError::BadStatus {
                        url: request.url,
                        status: response.status,
                    });
                }
                Ok::<_, CacheError>((request.url, response))
            }
        });
        let fetched = future::try_join_all(fetches).await?;

        for (url, response) in fetched {
            self.store.put(cache_name, &url, response).await?;
        }
        log::info!(
            "offline-cache: cached {} shell assets in {}",
            self.asset_urls.len(),
            cache_name
        );

        self.host.skip_waiting().await
    }

    /// Take over as the already activated worker of a restarted script.
    ///
    /// The shell bucket is whatever the earlier install left; a missing entry
    /// is just a cache miss. Calling it again once `Active` does nothing.
    pub fn resume(&self) -> Result<()> {
        match self.state.get() {
            WorkerState::Active => Ok(()),
            WorkerState::Installing => {
                log::info!("offline-cache: resumed {} as Active", self.cache_name());
                self.state.set(WorkerState::Active);
                Ok(())
            }
            state => Err(CacheError::InvalidTransition { operation: "resume", state }),
        }
    }

    /// Delete every bucket but the current one and claim open pages.
    /// Returns the names of the deleted buckets.
    pub async fn activate(&self) -> Result<Vec<String>> {
        self.expect_state(WorkerState::Activating, "activate")?;
        let result = self.collect_stale().await;
        self.settle(result, WorkerState::Active, "activate")
    }

    async fn collect_stale(&self) -> Result<Vec<String>> {
        let current = self.cache_name();
        let stale: Vec<String> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != current)
            .collect();

        future::try_join_all(stale.iter().map(|name| self.store.delete(name))).await?;
        for name in &stale {
            log::info!("offline-cache: deleted stale cache {}", name);
        }

        self.host.claim_clients().await?;
        Ok(stale)
    }

    /// Answer an intercepted request, stale-while-revalidate.
    ///
    /// The cache lookup and the network request start together:
    /// - cached copy found first: serve it, hand back the network request as
    ///   the revalidation
    /// - network answered first with a cacheable response: serve it
    /// - otherwise prefer the cached copy, then whatever the network gave
    ///
    /// Cacheable network responses are written through to the cache. Only a
    /// miss combined with a network failure is an error.
    pub async fn fetch(&self, request: Request) -> Result<FetchDecision> {
        if self.state.get() != WorkerState::Active || !request.is_get() {
            return Ok(FetchDecision::Passthrough);
        }

        let url = request.url.clone();
        let lookup = self.lookup(&url);
        let network = self.fetch_and_store(request);

        let served = match future::select(lookup, network).await {
            Either::Left((Some(cached), network)) => {
                log::debug!("offline-cache: hit {}", url);
                let target = url.clone();
                let revalidation = network
                    .map(move |result| {
                        if let Err(e) = result {
                            log::warn!("offline-cache: revalidating {} failed: {}", target, e);
                        }
                    })
                    .boxed_local();
                Served {
                    response: cached,
                    source: Source::Cache,
                    revalidation: Some(revalidation),
                }
            }
            Either::Left((None, network)) => {
                log::debug!("offline-cache: miss {}", url);
                from_network(network.await?)
            }
            Either::Right((Ok(fresh), _)) if fresh.is_cacheable() => from_network(fresh),
            Either::Right((fetched, lookup)) => match lookup.await {
                Some(cached) => {
                    log::debug!("offline-cache: network unusable for {}, serving cache", url);
                    Served {
                        response: cached,
                        source: Source::Cache,
                        revalidation: None,
                    }
                }
                None => from_network(fetched?),
            },
        };
        Ok(FetchDecision::Respond(served))
    }

    /// Storage errors on lookup count as a miss.
    fn lookup<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Option<Response>> {
        async move {
            match self.store.match_url(self.cache_name(), url).await {
                Ok(hit) => hit,
                Err(e) => {
                    log::warn!("offline-cache: lookup of {} failed: {}", url, e);
                    None
                }
            }
        }
        .boxed_local()
    }

    /// The network half of a fetch. Owns its handles so it can outlive the
    /// call that started it.
    fn fetch_and_store(&self, request: Request) -> LocalBoxFuture<'static, Result<Response>> {
        let store = Rc::clone(&self.store);
        let network = Rc::clone(&self.network);
        let cache_name = self.manifest.cache_name.clone();

        async move {
            let response = network.fetch(&request).await?;
            if response.is_cacheable() {
                if let Err(e) = store.put(&cache_name, &request.url, response.clone()).await {
                    log::warn!("offline-cache: could not store {}: {}", request.url, e);
                }
            }
            Ok::<_, CacheError>(response)
        }
        .boxed_local()
    }
}

fn from_network(response: Response) -> Served {
    Served {
        response,
        source: Source::Network,
        revalidation: None,
    }
}
