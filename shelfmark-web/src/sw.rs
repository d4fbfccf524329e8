//! Service worker bindings for offline use.
//!
//! The same module is loaded by the worker script, which forwards the
//! lifecycle events:
//!
//! ```js
//! import init, { sw_install, sw_activate, sw_fetch } from "./shelfmark_web.js";
//! const ready = init();
//! self.addEventListener("install", (e) => e.waitUntil(ready.then(sw_install)));
//! self.addEventListener("activate", (e) => e.waitUntil(ready.then(sw_activate)));
//! self.addEventListener("fetch", (e) => {
//!     if (new URL(e.request.url).origin !== self.location.origin) return;
//!     e.respondWith(ready.then(() => sw_fetch(e.request)));
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Array, Promise, Uint8Array};
use shelfmark_core::cache::{
    CacheConfig, CachePolicy, CacheStore, Network, Request, RequestMode, Response, ResponseKind,
};
use shelfmark_core::CacheError;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{CacheStorage, ResponseInit, ServiceWorkerGlobalScope};

use crate::io::describe;

/// Pre-cache the asset manifest, then take over from any waiting worker.
#[wasm_bindgen]
pub fn sw_install() -> Promise {
    future_to_promise(async {
        let scope = scope()?;
        let originals = SharedOriginals::default();
        let installed = policy(&scope, None, &originals)?
            .install()
            .await
            .map_err(to_js)?;
        JsFuture::from(scope.skip_waiting()?).await?;
        log(&format!("shelfmark: cached {installed} assets"));
        Ok(JsValue::from(installed as u32))
    })
}

/// Drop older cache versions and control open pages immediately.
#[wasm_bindgen]
pub fn sw_activate() -> Promise {
    future_to_promise(async {
        let scope = scope()?;
        let originals = SharedOriginals::default();
        let removed = policy(&scope, None, &originals)?
            .activate()
            .await
            .map_err(to_js)?;
        JsFuture::from(scope.clients().claim()).await?;
        Ok(removed.into_iter().map(JsValue::from).collect::<Array>().into())
    })
}

/// Answer a request through the cache policy. The worker script only
/// forwards same-origin requests.
///
/// The browser response the policy settled on is returned untouched, so
/// redirects and headers reach the page as the server sent them.
#[wasm_bindgen]
pub fn sw_fetch(original: web_sys::Request) -> Promise {
    future_to_promise(async move {
        let request = Request {
            url: original.url(),
            method: original.method(),
            mode: match original.mode() {
                web_sys::RequestMode::Navigate => RequestMode::Navigate,
                web_sys::RequestMode::NoCors => RequestMode::NoCors,
                web_sys::RequestMode::Cors => RequestMode::Cors,
                _ => RequestMode::SameOrigin,
            },
        };
        let scope = scope()?;
        let originals = SharedOriginals::default();
        let response = policy(&scope, Some(original), &originals)?
            .handle(&request)
            .await
            .map_err(to_js)?;
        let served = originals.borrow_mut().take_last();
        match served {
            Some(live) => Ok(live.into()),
            None => Ok(to_web_response(&response)?.into()),
        }
    })
}

fn scope() -> Result<ServiceWorkerGlobalScope, JsValue> {
    js_sys::global().dyn_into().map_err(JsValue::from)
}

fn policy(
    scope: &ServiceWorkerGlobalScope,
    original: Option<web_sys::Request>,
    originals: &SharedOriginals,
) -> Result<CachePolicy<BrowserNetwork, BrowserCaches>, JsValue> {
    let network = BrowserNetwork {
        scope: scope.clone(),
        original,
        originals: Rc::clone(originals),
    };
    let caches = BrowserCaches {
        storage: scope.caches()?,
        originals: Rc::clone(originals),
    };
    Ok(CachePolicy::new(network, caches, CacheConfig::default()))
}

/// Browser responses seen while answering one event, keyed by url.
///
/// Kept unread; every use takes a `clone()` so the body stays available.
#[derive(Default)]
struct Originals {
    by_url: HashMap<String, web_sys::Response>,
    last: Option<String>,
}

type SharedOriginals = Rc<RefCell<Originals>>;

impl Originals {
    fn keep(&mut self, url: &str, response: web_sys::Response) {
        self.by_url.insert(url.to_string(), response);
        self.last = Some(url.to_string());
    }

    fn copy_of(&self, url: &str) -> Option<Result<web_sys::Response, JsValue>> {
        self.by_url.get(url).map(|response| response.clone())
    }

    /// The response most recently produced by the network or the cache
    fn take_last(&mut self) -> Option<web_sys::Response> {
        let url = self.last.take()?;
        self.by_url.remove(&url)
    }
}

/// `fetch` from the worker scope. The request that triggered the event is
/// replayed as-is so credentials, headers and body survive.
struct BrowserNetwork {
    scope: ServiceWorkerGlobalScope,
    original: Option<web_sys::Request>,
    originals: SharedOriginals,
}

#[async_trait(?Send)]
impl Network for BrowserNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, CacheError> {
        let pending = match &self.original {
            Some(original) if original.url() == request.url => {
                self.scope.fetch_with_request(original)
            }
            _ => self.scope.fetch_with_str(&request.url),
        };
        let network_error = |err: JsValue| CacheError::Network {
            url: request.url.clone(),
            reason: describe(&err),
        };
        let live: web_sys::Response = JsFuture::from(pending)
            .await
            .and_then(|value| value.dyn_into())
            .map_err(network_error)?;
        let copy = live.clone().map_err(network_error)?;
        let response = read_response(copy).await.map_err(network_error)?;
        self.originals.borrow_mut().keep(&request.url, live);
        Ok(response)
    }
}

/// The browser Cache API
struct BrowserCaches {
    storage: CacheStorage,
    originals: SharedOriginals,
}

impl BrowserCaches {
    async fn open(&self, bucket: &str) -> Result<web_sys::Cache, CacheError> {
        JsFuture::from(self.storage.open(bucket))
            .await
            .and_then(|cache| cache.dyn_into())
            .map_err(storage_error)
    }
}

#[async_trait(?Send)]
impl CacheStore for BrowserCaches {
    async fn bucket_names(&self) -> Result<Vec<String>, CacheError> {
        let keys = JsFuture::from(self.storage.keys())
            .await
            .map_err(storage_error)?;
        Ok(Array::from(&keys)
            .iter()
            .filter_map(|name| name.as_string())
            .collect())
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, CacheError> {
        let deleted = JsFuture::from(self.storage.delete(name))
            .await
            .map_err(storage_error)?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    async fn lookup(&self, bucket: &str, url: &str) -> Result<Option<Response>, CacheError> {
        let cache = self.open(bucket).await?;
        let found = JsFuture::from(cache.match_with_str(url))
            .await
            .map_err(storage_error)?;
        if found.is_undefined() {
            return Ok(None);
        }
        let cached: web_sys::Response = found.dyn_into().map_err(storage_error)?;
        let copy = cached.clone().map_err(storage_error)?;
        let response = read_response(copy).await.map_err(storage_error)?;
        self.originals.borrow_mut().keep(url, cached);
        Ok(Some(response))
    }

    async fn put(&self, bucket: &str, url: &str, response: Response) -> Result<(), CacheError> {
        let cache = self.open(bucket).await?;
        let original = self.originals.borrow().copy_of(url);
        let stored = match original {
            Some(copy) => copy,
            None => to_web_response(&response),
        }
        .map_err(storage_error)?;
        JsFuture::from(cache.put_with_str(url, &stored))
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

async fn read_response(response: web_sys::Response) -> Result<Response, JsValue> {
    let kind = match response.type_() {
        web_sys::ResponseType::Basic => ResponseKind::Basic,
        web_sys::ResponseType::Cors => ResponseKind::Cors,
        web_sys::ResponseType::Error => ResponseKind::Error,
        web_sys::ResponseType::Opaque => ResponseKind::Opaque,
        web_sys::ResponseType::Opaqueredirect => ResponseKind::OpaqueRedirect,
        _ => ResponseKind::Default,
    };
    let content_type = response.headers().get("content-type")?;
    let body = JsFuture::from(response.array_buffer()?).await?;

    Ok(Response {
        status: response.status(),
        kind,
        content_type,
        body: Uint8Array::new(&body).to_vec(),
    })
}

/// Rebuild a response from its bytes. Only `content-type` is carried over.
fn to_web_response(response: &Response) -> Result<web_sys::Response, JsValue> {
    // opaque and errored responses report status 0, which `ResponseInit` rejects
    if !(200..=599).contains(&response.status) {
        return Err(js_sys::Error::new(&format!(
            "cannot rebuild a response with status {}",
            response.status
        ))
        .into());
    }
    let init = ResponseInit::new();
    init.set_status(response.status);
    let headers = web_sys::Headers::new()?;
    if let Some(content_type) = &response.content_type {
        headers.set("content-type", content_type)?;
    }
    init.set_headers(&headers);

    // null-body statuses reject any body, even an empty one
    if matches!(response.status, 101 | 204 | 205 | 304) {
        return web_sys::Response::new_with_opt_buffer_source_and_init(None, &init);
    }
    let bytes = Uint8Array::from(response.body.as_slice());
    let body: &js_sys::Object = &bytes;
    web_sys::Response::new_with_opt_buffer_source_and_init(Some(body), &init)
}

fn storage_error(err: JsValue) -> CacheError {
    CacheError::Storage(describe(&err))
}

fn to_js(err: CacheError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}
