//! Offline serving scenarios against in-memory network and cache fakes.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use shelfmark_core::cache::{
    CacheConfig, CachePolicy, CacheStore, Network, Request, Response, ResponseKind,
};
use shelfmark_core::CacheError;

#[derive(Default)]
struct FakeNetwork {
    routes: RefCell<HashMap<String, Response>>,
    failing: RefCell<HashSet<String>>,
    offline: Cell<bool>,
    calls: RefCell<Vec<String>>,
}

impl FakeNetwork {
    fn serve(&self, url: &str, response: Response) {
        self.routes.borrow_mut().insert(url.to_string(), response);
    }

    fn fail(&self, url: &str) {
        self.failing.borrow_mut().insert(url.to_string());
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[async_trait(?Send)]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, CacheError> {
        self.calls.borrow_mut().push(request.url.clone());
        if self.offline.get() || self.failing.borrow().contains(&request.url) {
            return Err(CacheError::Network {
                url: request.url.clone(),
                reason: "unreachable".into(),
            });
        }
        Ok(self
            .routes
            .borrow()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Response::new(404, ResponseKind::Basic, "missing")))
    }
}

#[derive(Default)]
struct FakeCaches {
    buckets: RefCell<BTreeMap<String, HashMap<String, Response>>>,
    reject_puts: Cell<bool>,
    rejected_urls: RefCell<HashSet<String>>,
}

impl FakeCaches {
    fn seed(&self, bucket: &str, url: &str, response: Response) {
        self.buckets
            .borrow_mut()
            .entry(bucket.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    fn get(&self, bucket: &str, url: &str) -> Option<Response> {
        self.buckets.borrow().get(bucket)?.get(url).cloned()
    }

    fn reject(&self, url: &str) {
        self.rejected_urls.borrow_mut().insert(url.to_string());
    }

    fn entry_count(&self) -> usize {
        self.buckets.borrow().values().map(HashMap::len).sum()
    }
}

#[async_trait(?Send)]
impl CacheStore for FakeCaches {
    async fn bucket_names(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.buckets.borrow().keys().cloned().collect())
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.buckets.borrow_mut().remove(name).is_some())
    }

    async fn lookup(&self, bucket: &str, url: &str) -> Result<Option<Response>, CacheError> {
        Ok(self.get(bucket, url))
    }

    async fn put(&self, bucket: &str, url: &str, response: Response) -> Result<(), CacheError> {
        if self.reject_puts.get() || self.rejected_urls.borrow().contains(url) {
            return Err(CacheError::Storage("quota exceeded".into()));
        }
        self.seed(bucket, url, response);
        Ok(())
    }
}

const BUCKET: &str = "test-v2";

fn config(assets: &[&str]) -> CacheConfig {
    CacheConfig {
        version: BUCKET.to_string(),
        assets: assets.iter().map(|s| s.to_string()).collect(),
        app_shell: "/index.html".to_string(),
    }
}

#[tokio::test]
async fn install_is_all_or_nothing() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    net.serve("/a", Response::ok("a"));
    net.serve("/c", Response::ok("c"));
    net.fail("/b");

    let policy = CachePolicy::new(&net, &caches, config(&["/a", "/b", "/c"]));
    let err = policy.install().await.unwrap_err();

    assert!(matches!(err, CacheError::Network { ref url, .. } if url == "/b"));
    assert_eq!(caches.entry_count(), 0);
}

#[tokio::test]
async fn install_rejects_error_statuses() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    net.serve("/a", Response::ok("a"));

    let policy = CachePolicy::new(&net, &caches, config(&["/a", "/gone"]));
    let err = policy.install().await.unwrap_err();

    assert_eq!(
        err,
        CacheError::BadStatus {
            url: "/gone".into(),
            status: 404
        }
    );
    assert_eq!(caches.entry_count(), 0);
}

#[tokio::test]
async fn install_drops_partial_bucket_when_a_write_fails() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    for url in ["/a", "/b", "/c"] {
        net.serve(url, Response::ok(url));
    }
    caches.reject("/b");

    let policy = CachePolicy::new(&net, &caches, config(&["/a", "/b", "/c"]));
    let err = policy.install().await.unwrap_err();

    assert!(matches!(err, CacheError::Storage(_)));
    assert_eq!(caches.entry_count(), 0);
    assert!(caches.bucket_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn install_stores_every_asset() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    for url in ["/a", "/b", "/c"] {
        net.serve(url, Response::ok(url));
    }

    let policy = CachePolicy::new(&net, &caches, config(&["/a", "/b", "/c"]));
    assert_eq!(policy.install().await.unwrap(), 3);
    assert_eq!(caches.get(BUCKET, "/b"), Some(Response::ok("/b")));
}

#[tokio::test]
async fn activate_sweeps_older_versions() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.seed("test-v1", "/a", Response::ok("old"));
    caches.seed("other", "/x", Response::ok("x"));
    caches.seed(BUCKET, "/a", Response::ok("new"));

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let mut removed = policy.activate().await.unwrap();
    removed.sort();

    assert_eq!(removed, vec!["other".to_string(), "test-v1".to_string()]);
    assert_eq!(caches.bucket_names().await.unwrap(), vec![BUCKET.to_string()]);
}

#[tokio::test]
async fn navigation_prefers_network_and_keeps_a_copy() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.seed(BUCKET, "/book", Response::ok("stale"));
    net.serve("/book", Response::ok("fresh"));

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let response = policy.handle(&Request::navigate("/book")).await.unwrap();

    assert_eq!(response.body, b"fresh");
    assert_eq!(caches.get(BUCKET, "/book").unwrap().body, b"fresh");
}

#[tokio::test]
async fn navigation_offline_uses_cached_copy() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.seed(BUCKET, "/book", Response::ok("cached"));
    caches.seed(BUCKET, "/index.html", Response::ok("shell"));
    net.offline.set(true);

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let response = policy.handle(&Request::navigate("/book")).await.unwrap();
    assert_eq!(response.body, b"cached");
}

#[tokio::test]
async fn navigation_offline_falls_back_to_app_shell() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.seed(BUCKET, "/index.html", Response::ok("shell"));
    net.offline.set(true);

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let response = policy.handle(&Request::navigate("/never-seen")).await.unwrap();
    assert_eq!(response.body, b"shell");
}

#[tokio::test]
async fn navigation_offline_without_shell_fails() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    net.offline.set(true);

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let err = policy.handle(&Request::navigate("/book")).await.unwrap_err();
    assert_eq!(
        err,
        CacheError::Unavailable {
            url: "/book".into()
        }
    );
}

#[tokio::test]
async fn navigation_survives_cache_write_failure() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.reject_puts.set(true);
    net.serve("/", Response::ok("home"));

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let response = policy.handle(&Request::navigate("/")).await.unwrap();
    assert_eq!(response.body, b"home");
    assert_eq!(caches.entry_count(), 0);
}

#[tokio::test]
async fn navigation_returns_redirects_unchanged() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.reject_puts.set(true);
    let redirect = Response::new(0, ResponseKind::OpaqueRedirect, "");
    net.serve("/moved", redirect.clone());

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let response = policy.handle(&Request::navigate("/moved")).await.unwrap();
    assert_eq!(response, redirect);
}

#[tokio::test]
async fn asset_hit_skips_network() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.seed(BUCKET, "/styles.css", Response::ok("cached css"));
    net.serve("/styles.css", Response::ok("live css"));

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let response = policy.handle(&Request::get("/styles.css")).await.unwrap();

    assert_eq!(response.body, b"cached css");
    assert_eq!(net.call_count(), 0);
}

#[tokio::test]
async fn asset_miss_caches_only_same_origin_successes() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    net.serve("/icon.png", Response::ok("png"));
    net.serve("/cdn.js", Response::new(200, ResponseKind::Opaque, "js"));
    net.serve("/missing", Response::new(404, ResponseKind::Basic, ""));
    net.serve("/submit", Response::ok("posted"));

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    for request in [
        Request::get("/icon.png"),
        Request::get("/cdn.js"),
        Request::get("/missing"),
        Request::get("/submit").with_method("POST"),
    ] {
        policy.handle(&request).await.unwrap();
    }

    assert!(caches.get(BUCKET, "/icon.png").is_some());
    assert!(caches.get(BUCKET, "/cdn.js").is_none());
    assert!(caches.get(BUCKET, "/missing").is_none());
    assert!(caches.get(BUCKET, "/submit").is_none());
}

#[tokio::test]
async fn asset_miss_offline_propagates_failure() {
    let net = FakeNetwork::default();
    let caches = FakeCaches::default();
    caches.seed(BUCKET, "/index.html", Response::ok("shell"));
    net.offline.set(true);

    let policy = CachePolicy::new(&net, &caches, config(&[]));
    let err = policy.handle(&Request::get("/app.js")).await.unwrap_err();
    assert!(matches!(err, CacheError::Network { .. }));
}

#[tokio::test]
async fn default_manifest_matches_shipped_assets() {
    let config = CacheConfig::default();
    assert_eq!(config.app_shell, "./index.html");
    assert!(config.assets.contains(&"./styles.css".to_string()));
    assert!(config.assets.contains(&"./icons/icon-512.png".to_string()));
}
