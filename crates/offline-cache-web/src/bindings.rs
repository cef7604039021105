//! `CacheStore`, `Network` and `WorkerHost` on top of the service worker
//! global scope.

use async_trait::async_trait;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, CacheStorage, Headers, ResponseInit, ResponseType, ServiceWorkerGlobalScope};

use offline_cache::{CacheError, CacheStore, Network, Request, Response, ResponseKind, Result, WorkerHost};

/// Best-effort text for a thrown JS value.
pub fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn storage_error(value: JsValue) -> CacheError {
    CacheError::storage(describe(&value))
}

pub fn global_scope() -> std::result::Result<ServiceWorkerGlobalScope, JsValue> {
    js_sys::global()
        .dyn_into::<ServiceWorkerGlobalScope>()
        .map_err(|_| JsValue::from_str("not running in a service worker"))
}

pub fn kind_of(kind: ResponseType) -> ResponseKind {
    match kind {
        ResponseType::Basic => ResponseKind::Basic,
        ResponseType::Cors => ResponseKind::Cors,
        ResponseType::Opaque | ResponseType::Opaqueredirect => ResponseKind::Opaque,
        _ => ResponseKind::Other,
    }
}

/// Statuses whose responses must be constructed without a body.
fn is_null_body(status: u16) -> bool {
    matches!(status, 101 | 204 | 205 | 304)
}

/// Copy a fetch response (headers and full body) into Rust.
pub async fn read_response(response: &web_sys::Response) -> std::result::Result<Response, JsValue> {
    let mut headers = Vec::new();
    if let Some(entries) = js_sys::try_iter(&response.headers())? {
        for entry in entries {
            let pair: Array = entry?.unchecked_into();
            if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                headers.push((name, value));
            }
        }
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(Response {
        status: response.status(),
        kind: kind_of(response.type_()),
        headers,
        body: Uint8Array::new(&buffer).to_vec(),
    })
}

pub fn to_web_response(response: &Response) -> std::result::Result<web_sys::Response, JsValue> {
    let headers = Headers::new()?;
    for (name, value) in &response.headers {
        headers.append(name, value)?;
    }

    let init = ResponseInit::new();
    init.set_status(response.status);
    init.set_headers(&headers);

    if is_null_body(response.status) {
        return web_sys::Response::new_with_opt_buffer_source_and_init(None, &init);
    }
    let body = Uint8Array::from(response.body.as_slice());
    web_sys::Response::new_with_opt_buffer_source_and_init(Some(&body), &init)
}

pub struct BrowserCache {
    storage: CacheStorage,
}

impl BrowserCache {
    pub fn new(scope: &ServiceWorkerGlobalScope) -> Result<Self> {
        let storage = scope.caches().map_err(storage_error)?;
        Ok(Self { storage })
    }

    async fn bucket(&self, cache_name: &str) -> Result<Cache> {
        let cache = JsFuture::from(self.storage.open(cache_name))
            .await
            .map_err(storage_error)?;
        Ok(cache.unchecked_into())
    }
}

#[async_trait(?Send)]
impl CacheStore for BrowserCache {
    async fn open(&self, cache_name: &str) -> Result<()> {
        self.bucket(cache_name).await.map(|_| ())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let keys = JsFuture::from(self.storage.keys())
            .await
            .map_err(storage_error)?;
        let keys: Array = keys.unchecked_into();
        Ok(keys.iter().filter_map(|key| key.as_string()).collect())
    }

    async fn delete(&self, cache_name: &str) -> Result<bool> {
        let deleted = JsFuture::from(self.storage.delete(cache_name))
            .await
            .map_err(storage_error)?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    async fn match_url(&self, cache_name: &str, url: &str) -> Result<Option<Response>> {
        let cache = self.bucket(cache_name).await?;
        let found = JsFuture::from(cache.match_with_str(url))
            .await
            .map_err(storage_error)?;
        if found.is_undefined() {
            return Ok(None);
        }
        let response: web_sys::Response = found.unchecked_into();
        read_response(&response).await.map(Some).map_err(storage_error)
    }

    async fn put(&self, cache_name: &str, url: &str, response: Response) -> Result<()> {
        let cache = self.bucket(cache_name).await?;
        let response = to_web_response(&response).map_err(storage_error)?;
        JsFuture::from(cache.put_with_str(url, &response))
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

pub struct BrowserNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl BrowserNetwork {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl Network for BrowserNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let failed = |e: JsValue| CacheError::network(&request.url, describe(&e));
        let response = JsFuture::from(self.scope.fetch_with_str(&request.url))
            .await
            .map_err(failed)?;
        let response: web_sys::Response = response.unchecked_into();
        read_response(&response).await.map_err(failed)
    }
}

pub struct BrowserHost {
    scope: ServiceWorkerGlobalScope,
}

impl BrowserHost {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl WorkerHost for BrowserHost {
    async fn skip_waiting(&self) -> Result<()> {
        let promise = self.scope.skip_waiting().map_err(storage_error)?;
        JsFuture::from(promise).await.map_err(storage_error)?;
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        JsFuture::from(self.scope.clients().claim())
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_types_map_to_kinds() {
        assert_eq!(kind_of(ResponseType::Basic), ResponseKind::Basic);
        assert_eq!(kind_of(ResponseType::Cors), ResponseKind::Cors);
        assert_eq!(kind_of(ResponseType::Opaque), ResponseKind::Opaque);
        assert_eq!(kind_of(ResponseType::Error), ResponseKind::Other);
    }

    #[test]
    fn bodiless_statuses() {
        assert!(is_null_body(204));
        assert!(is_null_body(304));
        assert!(!is_null_body(200));
        assert!(!is_null_body(404));
    }
}
