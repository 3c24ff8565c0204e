//! Transport for fetching public key material.
//!
//! [`KeyTransport`] is the seam the remote-key flow depends on. One request
//! is outstanding per attempt; the flow never pipelines attempts.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, USER_AGENT};
use tracing::{debug, warn};

use crate::cache::KeyCache;
use crate::config::TransportConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::types::{CachePolicy, KeyRequest};

/// Fetches the body behind a [`KeyRequest`].
///
/// [`CryptoError::Transport`] means nothing was received. A response that
/// arrived with a non-success status is [`CryptoError::KeyResponse`] and is
/// never cached.
#[async_trait]
pub trait KeyTransport: Send + Sync {
    async fn fetch(&self, request: &KeyRequest) -> CryptoResult<String>;
}

/// reqwest-backed transport with a [`KeyCache`].
#[derive(Debug, Clone)]
pub struct HttpKeyTransport {
    client: reqwest::Client,
    cache: KeyCache,
}

impl HttpKeyTransport {
    pub fn new(config: TransportConfig) -> CryptoResult<Self> {
        let cache = match config.effective_cache_dir() {
            Some(dir) => KeyCache::with_dir(dir.clone()),
            None => KeyCache::in_memory(),
        };
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: TransportConfig, cache: KeyCache) -> CryptoResult<Self> {
        let mut default_headers = HeaderMap::new();
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|e| CryptoError::Config {
                message: format!("invalid user agent: {}", e),
            })?;
        default_headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| CryptoError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, cache })
    }

    pub fn from_env() -> CryptoResult<Self> {
        Self::new(TransportConfig::from_env())
    }

    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    async fn fetch_network(&self, url: &str) -> CryptoResult<String> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CryptoError::KeyResponse {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| CryptoError::Transport {
            message: format!("failed to read response body: {}", e),
        })?;

        if let Err(e) = self.cache.put(url, &body).await {
            warn!(url, error = %e, "failed to cache key response");
        }

        Ok(body)
    }
}

#[async_trait]
impl KeyTransport for HttpKeyTransport {
    async fn fetch(&self, request: &KeyRequest) -> CryptoResult<String> {
        if request.cache_policy == CachePolicy::PreferCache {
            match self.cache.get(&request.url).await {
                Ok(Some(entry)) => return Ok(entry.body),
                Ok(None) => {}
                Err(e) => warn!(url = %request.url, error = %e, "key cache read failed"),
            }
        }

        debug!(url = %request.url, policy = ?request.cache_policy, "fetching public key");
        self.fetch_network(&request.url).await
    }
}
