// src/services/fetch.rs

//! Cache-backed page fetcher.

use std::time::Duration;

use crate::cache::{CacheManager, CacheStats};
use crate::config::WikiConfig;
use crate::error::{AppError, Result};

/// Resolves URLs to page content, consulting the persistent cache before
/// touching the network. Strictly one request in flight at a time.
pub struct WikiFetcher {
    client: reqwest::Client,
    cache: CacheManager,
    force_refresh: bool,
}

impl WikiFetcher {
    /// Create a fetcher with a configured HTTP client.
    pub fn new(config: &WikiConfig, cache: CacheManager, force_refresh: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            cache,
            force_refresh,
        })
    }

    /// Fetch URL content, cache first. On a miss (or forced refresh)
    /// performs exactly one retrieval and populates the cache on success.
    pub async fn fetch(&mut self, url: &str) -> Result<String> {
        if !self.force_refresh {
            if let Some(cached) = self.cache.get(url).await {
                log::debug!("Using cached content for {url}");
                return Ok(cached);
            }
        }

        log::info!("Fetching fresh content from {url}");
        let content = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::fetch(url, e))?
            .text()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        self.cache.set(url, &content).await;
        Ok(content)
    }

    /// True if the cache holds a fresh entry for `url`; callers use this
    /// to skip the rate-limiting delay for cached pages.
    pub async fn is_cached(&self, url: &str) -> bool {
        self.cache.is_fresh(url).await
    }

    /// Snapshot of the underlying cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
