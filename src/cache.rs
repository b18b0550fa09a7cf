// src/cache.rs

//! Persistent cache for fetched wiki pages.
//!
//! One JSON file per URL, keyed by a SHA-256 digest of the URL, stored
//! under a configurable directory. Entries carry the original URL, the
//! page content, and an ISO-8601 creation timestamp. Read failures of
//! any kind are downgraded to cache misses; the cache never fails a
//! caller.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// A single cached page on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    content: String,
    timestamp: DateTime<Utc>,
}

/// Process-lifetime cache counters, owned by the [`CacheManager`] instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub errors: u64,
}

impl CacheStats {
    /// Total lookups that went through the cache.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses + self.expired
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.lookups();
        if total == 0 {
            return write!(f, "no cache activity recorded");
        }
        let hit_rate = (self.hits as f64 / total as f64) * 100.0;
        write!(
            f,
            "{} hits, {} misses, {} expired, {} errors ({:.1}% hit rate)",
            self.hits, self.misses, self.expired, self.errors, hit_rate
        )
    }
}

/// Manages caching for web requests to reduce server load.
#[derive(Debug)]
pub struct CacheManager {
    cache_dir: PathBuf,
    default_ttl: TimeDelta,
    stats: CacheStats,
}

impl CacheManager {
    /// Create a cache manager rooted at `cache_dir`, creating the
    /// directory if needed.
    pub async fn new(cache_dir: impl Into<PathBuf>, ttl_hours: u64) -> Result<Self> {
        let cache_dir = cache_dir.into();
        tokio::fs::create_dir_all(&cache_dir).await?;
        Ok(Self {
            cache_dir,
            default_ttl: TimeDelta::hours(ttl_hours as i64),
            stats: CacheStats::default(),
        })
    }

    /// Stable one-way digest of a URL: identical URLs always map to the
    /// same storage location regardless of run.
    pub fn cache_key(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", Self::cache_key(url)))
    }

    /// Get cached content for a URL with the default TTL.
    pub async fn get(&mut self, url: &str) -> Option<String> {
        self.get_with_ttl(url, self.default_ttl).await
    }

    /// Get cached content for a URL if it exists and is younger than `ttl`.
    pub async fn get_with_ttl(&mut self, url: &str, ttl: TimeDelta) -> Option<String> {
        let path = self.cache_path(url);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.stats.misses += 1;
                return None;
            }
            Err(e) => {
                log::warn!("Cache error for {url}: {e}");
                self.stats.errors += 1;
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cache error for {url}: {e}");
                self.stats.errors += 1;
                return None;
            }
        };

        if Utc::now() - entry.timestamp > ttl {
            self.stats.expired += 1;
            return None;
        }

        self.stats.hits += 1;
        Some(entry.content)
    }

    /// True if a fresh entry exists for `url`. Does not touch the counters;
    /// used by the rate limiter to decide whether a delay is owed.
    pub async fn is_fresh(&self, url: &str) -> bool {
        let path = self.cache_path(url);
        let Ok(bytes) = tokio::fs::read(&path).await else {
            return false;
        };
        let Ok(entry) = serde_json::from_slice::<CacheEntry>(&bytes) else {
            return false;
        };
        Utc::now() - entry.timestamp <= self.default_ttl
    }

    /// Durably store content for a URL, overwriting any prior entry.
    /// Persist failures are logged and counted, never propagated.
    pub async fn set(&mut self, url: &str, content: &str) {
        let entry = CacheEntry {
            url: url.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };

        if let Err(e) = self.write_entry(&self.cache_path(url), &entry).await {
            log::warn!("Failed to cache {url}: {e}");
            self.stats.errors += 1;
        }
    }

    /// Write an entry atomically (write to temp, then rename).
    async fn write_entry(&self, path: &Path, entry: &CacheEntry) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entry).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Delete all cached entries. Partial failures are reported per file
    /// and tolerated.
    pub async fn clear(&self) -> Result<()> {
        let mut dir = tokio::fs::read_dir(&self.cache_dir).await?;
        while let Some(dir_entry) = dir.next_entry().await? {
            let path = dir_entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    log::warn!("Failed to delete {}: {e}", path.display());
                }
            }
        }
        Ok(())
    }

    /// Snapshot of the counters accumulated so far.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://zdoom.org/wiki/Classes:ZombieMan";

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let tmp = TempDir::new().unwrap();
        let mut cache = CacheManager::new(tmp.path(), 1).await.unwrap();

        cache.set(URL, "<html>zombie</html>").await;
        let content = cache.get(URL).await;

        assert_eq!(content.as_deref(), Some("<html>zombie</html>"));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 0);
    }

    #[tokio::test]
    async fn get_absent_counts_miss() {
        let tmp = TempDir::new().unwrap();
        let mut cache = CacheManager::new(tmp.path(), 1).await.unwrap();

        assert!(cache.get(URL).await.is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn expired_entry_counts_expired() {
        let tmp = TempDir::new().unwrap();
        let mut cache = CacheManager::new(tmp.path(), 1).await.unwrap();

        // Backdate an entry past the one hour TTL.
        let entry = CacheEntry {
            url: URL.to_string(),
            content: "stale".to_string(),
            timestamp: Utc::now() - TimeDelta::hours(2),
        };
        let path = tmp.path().join(format!("{}.json", CacheManager::cache_key(URL)));
        std::fs::write(&path, serde_json::to_vec_pretty(&entry).unwrap()).unwrap();

        assert!(cache.get(URL).await.is_none());
        assert_eq!(cache.stats().expired, 1);
        assert!(!cache.is_fresh(URL).await);
    }

    #[tokio::test]
    async fn corrupt_entry_counts_error_and_misses() {
        let tmp = TempDir::new().unwrap();
        let mut cache = CacheManager::new(tmp.path(), 1).await.unwrap();

        let path = tmp.path().join(format!("{}.json", CacheManager::cache_key(URL)));
        std::fs::write(&path, b"not json at all").unwrap();

        assert!(cache.get(URL).await.is_none());
        assert_eq!(cache.stats().errors, 1);
    }

    #[tokio::test]
    async fn overwrite_supersedes_entry() {
        let tmp = TempDir::new().unwrap();
        let mut cache = CacheManager::new(tmp.path(), 1).await.unwrap();

        cache.set(URL, "first").await;
        cache.set(URL, "second").await;

        assert_eq!(cache.get(URL).await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn clear_removes_entries() {
        let tmp = TempDir::new().unwrap();
        let mut cache = CacheManager::new(tmp.path(), 1).await.unwrap();

        cache.set(URL, "content").await;
        cache.clear().await.unwrap();

        assert!(cache.get(URL).await.is_none());
    }

    #[test]
    fn cache_key_is_stable_and_distinct() {
        let a1 = CacheManager::cache_key("https://zdoom.org/wiki/a");
        let a2 = CacheManager::cache_key("https://zdoom.org/wiki/a");
        let b = CacheManager::cache_key("https://zdoom.org/wiki/b");
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
    }

    #[test]
    fn stats_display_reports_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            expired: 0,
            errors: 0,
        };
        assert_eq!(
            stats.to_string(),
            "3 hits, 1 misses, 0 expired, 0 errors (75.0% hit rate)"
        );
        assert_eq!(
            CacheStats::default().to_string(),
            "no cache activity recorded"
        );
    }
}
