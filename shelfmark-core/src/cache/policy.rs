use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::types::{CacheConfig, Request, Response};
use crate::error::CacheError;

/// Outbound fetch
#[async_trait(?Send)]
pub trait Network {
    async fn fetch(&self, request: &Request) -> Result<Response, CacheError>;
}

/// Named buckets of url → response pairs.
///
/// Implementations are expected to make each `put` and `lookup` atomic.
#[async_trait(?Send)]
pub trait CacheStore {
    async fn bucket_names(&self) -> Result<Vec<String>, CacheError>;
    async fn delete_bucket(&self, name: &str) -> Result<bool, CacheError>;
    async fn lookup(&self, bucket: &str, url: &str) -> Result<Option<Response>, CacheError>;
    async fn put(&self, bucket: &str, url: &str, response: Response) -> Result<(), CacheError>;
}

#[async_trait(?Send)]
impl<T: Network + ?Sized> Network for &T {
    async fn fetch(&self, request: &Request) -> Result<Response, CacheError> {
        (**self).fetch(request).await
    }
}

#[async_trait(?Send)]
impl<T: CacheStore + ?Sized> CacheStore for &T {
    async fn bucket_names(&self) -> Result<Vec<String>, CacheError> {
        (**self).bucket_names().await
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, CacheError> {
        (**self).delete_bucket(name).await
    }

    async fn lookup(&self, bucket: &str, url: &str) -> Result<Option<Response>, CacheError> {
        (**self).lookup(bucket, url).await
    }

    async fn put(&self, bucket: &str, url: &str, response: Response) -> Result<(), CacheError> {
        (**self).put(bucket, url, response).await
    }
}

/// Offline serving rules: network-first for page loads, cache-first for
/// everything else, one versioned bucket.
pub struct CachePolicy<N, C> {
    network: N,
    caches: C,
    config: CacheConfig,
}

impl<N: Network, C: CacheStore> CachePolicy<N, C> {
    pub fn new(network: N, caches: C, config: CacheConfig) -> Self {
        Self {
            network,
            caches,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Pre-cache the asset manifest.
    ///
    /// Every asset is fetched before anything is written; one failed fetch
    /// or non-2xx answer aborts the install with nothing cached.
    pub async fn install(&self) -> Result<usize, CacheError> {
        let mut fetched = Vec::with_capacity(self.config.assets.len());
        for url in &self.config.assets {
            let response = self.network.fetch(&Request::get(url.as_str())).await?;
            if !response.is_ok() {
                return Err(CacheError::BadStatus {
                    url: url.clone(),
                    status: response.status,
                });
            }
            fetched.push((url, response));
        }

        let bucket = &self.config.version;
        for (url, response) in fetched {
            if let Err(err) = self.caches.put(bucket, url, response).await {
                // drop the half-written bucket so the next install starts clean
                if let Err(cleanup) = self.caches.delete_bucket(bucket).await {
                    warn!(%bucket, error = %cleanup, "could not drop partial bucket");
                }
                return Err(err);
            }
        }

        info!(%bucket, assets = self.config.assets.len(), "offline assets installed");
        Ok(self.config.assets.len())
    }

    /// Delete every bucket except the current one; returns the deleted names
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut removed = Vec::new();
        for name in self.caches.bucket_names().await? {
            if name != self.config.version && self.caches.delete_bucket(&name).await? {
                removed.push(name);
            }
        }
        info!(current = %self.config.version, removed = removed.len(), "cache activated");
        Ok(removed)
    }

    pub async fn handle(&self, request: &Request) -> Result<Response, CacheError> {
        if request.is_navigation() {
            self.network_first(request).await
        } else {
            self.cache_first(request).await
        }
    }

    async fn network_first(&self, request: &Request) -> Result<Response, CacheError> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_copy(&request.url, &response).await;
                Ok(response)
            }
            Err(err) => {
                debug!(url = %request.url, error = %err, "navigation offline, trying cache");
                if let Some(cached) = self.lookup(&request.url).await {
                    return Ok(cached);
                }
                if let Some(shell) = self.lookup(&self.config.app_shell).await {
                    debug!(url = %request.url, "serving app shell");
                    return Ok(shell);
                }
                Err(CacheError::Unavailable {
                    url: request.url.clone(),
                })
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<Response, CacheError> {
        if let Some(cached) = self.lookup(&request.url).await {
            debug!(url = %request.url, "cache hit");
            return Ok(cached);
        }

        let response = self.network.fetch(request).await?;
        if request.is_get() && response.is_cacheable_asset() {
            self.store_copy(&request.url, &response).await;
        }
        Ok(response)
    }

    /// Storage failures count as a miss
    async fn lookup(&self, url: &str) -> Option<Response> {
        match self.caches.lookup(&self.config.version, url).await {
            Ok(found) => found,
            Err(err) => {
                warn!(%url, error = %err, "cache lookup failed");
                None
            }
        }
    }

    /// A failed write never fails the response it copies
    async fn store_copy(&self, url: &str, response: &Response) {
        if let Err(err) = self
            .caches
            .put(&self.config.version, url, response.clone())
            .await
        {
            warn!(%url, error = %err, "could not cache response");
        }
    }
}
