//! Key response cache backing [`crate::types::CachePolicy::PreferCache`].
//!
//! Entries live in memory and, when a directory is configured, on disk:
//!
//! ```text
//! <cache_dir>/<sha256(url)>.json   # url, body, body digest, fetched_at
//! ```
//!
//! Every read re-checks the body against its stored digest. An entry that
//! fails the check is evicted and reported as a miss, so the caller refetches.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::digest::{sha256_hex, sha256_hex_bytes};
use crate::error::{CryptoError, CryptoResult};

/// A cached key response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedKey {
    /// URL the body was fetched from.
    pub url: String,

    /// Response body (PEM text).
    pub body: String,

    /// Body digest (sha256:...).
    pub digest: String,

    /// When the body was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl CachedKey {
    fn new(url: &str, body: &str) -> Self {
        Self {
            url: url.to_string(),
            body: body.to_string(),
            digest: sha256_hex_bytes(body.as_bytes()),
            fetched_at: Utc::now(),
        }
    }

    fn is_intact(&self) -> bool {
        self.digest == sha256_hex_bytes(self.body.as_bytes())
    }
}

/// Memory + optional disk cache of key responses, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct KeyCache {
    dir: Option<PathBuf>,
    memory: Arc<RwLock<HashMap<String, CachedKey>>>,
}

impl KeyCache {
    /// Cache that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache persisted under `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            memory: Arc::default(),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn entry_path(&self, url: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", sha256_hex(url.as_bytes()))))
    }

    /// Look up a cached body. Stale entries are served; there is no TTL.
    pub async fn get(&self, url: &str) -> CryptoResult<Option<CachedKey>> {
        let in_memory = self.memory.read().await.get(url).cloned();
        if let Some(entry) = in_memory {
            if entry.is_intact() {
                debug!(url, "key cache hit (memory)");
                return Ok(Some(entry));
            }
        }

        let Some(path) = self.entry_path(url) else {
            debug!(url, "key cache miss");
            return Ok(None);
        };

        if !path.exists() {
            debug!(url, "key cache miss");
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| CryptoError::cache(format!("failed to read cache entry: {}", e)))?;

        let entry = match serde_json::from_str::<CachedKey>(&content) {
            Ok(entry) if entry.url == url && entry.is_intact() => entry,
            Ok(_) => {
                warn!(url, "key cache entry failed integrity check, evicting");
                self.evict(url).await?;
                return Ok(None);
            }
            Err(e) => {
                warn!(url, error = %e, "unreadable key cache entry, evicting");
                self.evict(url).await?;
                return Ok(None);
            }
        };

        debug!(url, fetched_at = %entry.fetched_at, "key cache hit (disk)");
        self.memory
            .write()
            .await
            .insert(url.to_string(), entry.clone());
        Ok(Some(entry))
    }

    /// Store a body for `url`, replacing any previous entry.
    pub async fn put(&self, url: &str, body: &str) -> CryptoResult<()> {
        let entry = CachedKey::new(url, body);

        if let Some(path) = self.entry_path(url) {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    CryptoError::cache(format!("failed to create cache directory: {}", e))
                })?;
            }

            let json = serde_json::to_string_pretty(&entry)
                .map_err(|e| CryptoError::cache(format!("failed to serialize entry: {}", e)))?;
            write_atomic(&path, &json).await?;
        }

        self.memory.write().await.insert(url.to_string(), entry);
        debug!(url, "cached key response");
        Ok(())
    }

    /// Drop the entry for `url`.
    pub async fn evict(&self, url: &str) -> CryptoResult<()> {
        self.memory.write().await.remove(url);

        if let Some(path) = self.entry_path(url) {
            if path.exists() {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| CryptoError::cache(format!("failed to evict entry: {}", e)))?;
                debug!(url, "evicted key cache entry");
            }
        }
        Ok(())
    }

    /// Drop every entry.
    pub async fn clear(&self) -> CryptoResult<()> {
        self.memory.write().await.clear();

        if let Some(dir) = &self.dir {
            if dir.exists() {
                fs::remove_dir_all(dir)
                    .await
                    .map_err(|e| CryptoError::cache(format!("failed to clear cache: {}", e)))?;
                debug!("cleared key cache");
            }
        }
        Ok(())
    }
}

async fn write_atomic(path: &Path, content: &str) -> CryptoResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .await
        .map_err(|e| CryptoError::cache(format!("failed to write temp file: {}", e)))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| CryptoError::cache(format!("failed to rename temp file: {}", e)))?;

    Ok(())
}
