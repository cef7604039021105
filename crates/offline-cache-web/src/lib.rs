//! Service worker entry points.
//!
//! The worker script forwards its lifecycle events:
//!
//! ```js
//! import init, { sw_init, sw_install, sw_activate, sw_fetch } from './offline_cache_web.js';
//! const ready = init().then(() => sw_init('', self.registration.scope));
//! self.addEventListener('install', e => e.waitUntil(ready.then(sw_install)));
//! self.addEventListener('activate', e => e.waitUntil(ready.then(sw_activate)));
//! self.addEventListener('fetch', e => {
//!   const reply = sw_fetch(e.request);
//!   if (reply) e.respondWith(reply);
//! });
//! ```

pub mod bindings;

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};

use offline_cache::manifest::origin;
use offline_cache::{CacheError, FetchDecision, OfflineWorker, Request, ShellManifest, WorkerState};

use bindings::{global_scope, to_web_response, BrowserCache, BrowserHost, BrowserNetwork};

type Worker = OfflineWorker<BrowserCache, BrowserNetwork, BrowserHost>;

thread_local! {
    static WORKER: RefCell<Option<Rc<Worker>>> = RefCell::new(None);
}

fn to_js(error: CacheError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn worker() -> Result<Rc<Worker>, JsValue> {
    WORKER
        .with(|cell| cell.borrow().clone())
        .ok_or_else(|| JsValue::from_str("offline cache not initialized. Call sw_init() first."))
}

/// Create the worker for `scope`. An empty `manifest_json` selects the
/// manifest bundled with the game.
#[wasm_bindgen]
pub fn sw_init(manifest_json: &str, scope: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let manifest = if manifest_json.trim().is_empty() {
        ShellManifest::bundled()
    } else {
        ShellManifest::from_json(manifest_json)
    }
    .map_err(to_js)?;

    let global = global_scope()?;
    let store = BrowserCache::new(&global).map_err(to_js)?;
    let worker = OfflineWorker::new(
        manifest,
        scope,
        Rc::new(store),
        Rc::new(BrowserNetwork::new(global.clone())),
        BrowserHost::new(global),
    )
    .map_err(to_js)?;

    log::info!(
        "offline-cache: {} assets for {} under {}",
        worker.asset_urls().len(),
        worker.cache_name(),
        scope
    );
    WORKER.with(|cell| *cell.borrow_mut() = Some(Rc::new(worker)));
    Ok(())
}

#[wasm_bindgen]
pub fn sw_install() -> Promise {
    future_to_promise(async move {
        let worker = worker()?;
        worker.install().await.map_err(to_js)?;
        Ok(JsValue::UNDEFINED)
    })
}

/// Resolves with the names of the deleted stale buckets.
#[wasm_bindgen]
pub fn sw_activate() -> Promise {
    future_to_promise(async move {
        let worker = worker()?;
        let deleted = worker.activate().await.map_err(to_js)?;
        Ok(deleted.into_iter().map(JsValue::from).collect::<js_sys::Array>().into())
    })
}

/// A promise for the response, or `undefined` when the request should go to
/// the network untouched.
#[wasm_bindgen]
pub fn sw_fetch(request: web_sys::Request) -> Option<Promise> {
    let worker = worker().ok()?;

    // Fetch events only reach the registration's active worker. Seeing one
    // before install means the script was restarted after going idle.
    if worker.state() == WorkerState::Installing {
        if let Err(e) = worker.resume() {
            log::warn!("offline-cache: {}", e);
        }
    }

    let intercepted = Request::new(request.method(), request.url());
    // Foreign responses are never cached, so there is nothing to serve offline
    if worker.state() != WorkerState::Active
        || !intercepted.is_get()
        || origin(&intercepted.url) != origin(worker.scope())
    {
        return None;
    }

    Some(future_to_promise(async move {
        match worker.fetch(intercepted).await.map_err(to_js)? {
            FetchDecision::Respond(served) => {
                if let Some(revalidation) = served.revalidation {
                    spawn_local(revalidation);
                }
                Ok(to_web_response(&served.response)?.into())
            }
            // State changed while the promise was pending
            FetchDecision::Passthrough => {
                let global = global_scope()?;
                JsFuture::from(global.fetch_with_request(&request)).await
            }
        }
    }))
}
