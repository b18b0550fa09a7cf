//! Pipeline entry point.
//!
//! Discover categories → flatten → resolve the partition → render and
//! write the generated header. Every network-touching step goes through
//! the cache-backed fetcher; execution is strictly sequential.

pub mod generate;
pub mod resolve;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheManager;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::{WikiFetcher, categories, classes, metadata};

pub use generate::render_header;
pub use resolve::{flatten_classes, resolve_partition};

/// Per-run options, typically derived from CLI flags.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Ignore cached pages and fetch fresh content
    pub force_refresh: bool,
    /// Delete all cached pages before running
    pub clear_cache: bool,
    /// Fetch per-class metadata tables (throttled)
    pub with_metadata: bool,
    /// Compare the flattened universe against the canonical class index
    pub cross_check: bool,
    /// Copy the generated header to this directory as well
    pub copy_to: Option<PathBuf>,
}

/// Run the full extraction pipeline and write the generated header.
pub async fn run(config: &Config, options: &RunOptions) -> Result<()> {
    let cache = CacheManager::new(&config.cache.dir, config.cache.ttl_hours).await?;

    if options.clear_cache {
        log::info!("Clearing cache...");
        cache.clear().await?;
        log::info!("Cache cleared.");
    }

    let mut fetcher = WikiFetcher::new(&config.wiki, cache, options.force_refresh)?;

    log::info!("Fetching ZDoom categories by type...");
    let categories = categories::discover_categories(&mut fetcher, &config.wiki)
        .await?
        .ok_or_else(|| {
            AppError::discovery("Could not find 'Categories by type' section")
        })?;

    if categories.is_empty() {
        return Err(AppError::discovery(
            "No categories found. Check if the wiki structure has changed.",
        ));
    }

    log::info!("Flattening categories into class list...");
    let class_names = flatten_classes(&categories);
    log::info!(
        "Found {} unique class names from {} categories",
        class_names.len(),
        categories.len()
    );

    if options.cross_check {
        cross_check_classes(&mut fetcher, config, &class_names).await?;
    }

    if options.with_metadata {
        log::info!("Fetching class data from individual pages...");
        let delay = Duration::from_secs_f64(config.fetch.sleep_secs);
        let metadata =
            metadata::fetch_class_metadata(&mut fetcher, &config.wiki, &class_names, delay)
                .await?;

        let editor_ids = metadata.values().filter(|m| m.editor_id.is_some()).count();
        let spawn_ids = metadata.values().filter(|m| m.spawn_id.is_some()).count();
        let identifiers = metadata.values().filter(|m| m.identifier.is_some()).count();
        log::info!(
            "Collected metadata for {} classes ({editor_ids} editor ids, {spawn_ids} spawn ids, {identifiers} identifiers)",
            metadata.len()
        );
    }

    let partition = resolve_partition(&categories, &class_names)?;
    let header = render_header(&partition);

    let header_path = PathBuf::from(format!("{}.h", config.output.base));
    write_artifact(&header_path, &header).await?;
    log::info!(
        "Generated header file {} with {} classes from {} categories",
        header_path.display(),
        partition.class_count(),
        partition.category_count()
    );

    if let Some(copy_to) = &options.copy_to {
        let file_name = header_path
            .file_name()
            .ok_or_else(|| AppError::config("output.base has no file name"))?;
        tokio::fs::create_dir_all(copy_to).await?;
        tokio::fs::copy(&header_path, copy_to.join(file_name)).await?;
        log::info!("Copied header to {}", copy_to.display());
    }

    log::info!("Cache stats: {}", fetcher.cache_stats());
    Ok(())
}

/// Warn about differences between the canonical class index and the
/// flattened category universe.
async fn cross_check_classes(
    fetcher: &mut WikiFetcher,
    config: &Config,
    class_names: &[String],
) -> Result<()> {
    log::info!("Cross-checking against {}", config.wiki.classes_url());
    let canonical = classes::fetch_class_list(fetcher, &config.wiki.classes_url()).await?;

    let universe: std::collections::BTreeSet<String> =
        class_names.iter().map(|c| c.to_lowercase()).collect();
    let canonical_set: std::collections::BTreeSet<String> =
        canonical.iter().map(|c| c.to_lowercase()).collect();

    for missing in canonical_set.difference(&universe) {
        log::warn!("Class {missing} is indexed but not listed in any category");
    }
    for extra in universe.difference(&canonical_set) {
        log::warn!("Class {extra} is categorized but missing from the class index");
    }
    Ok(())
}

/// Write the artifact atomically (write to temp, then rename).
async fn write_artifact(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("h.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_artifact_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out/nested/doom_classes.h");

        write_artifact(&path, "#pragma once\n").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "#pragma once\n");
    }

    #[tokio::test]
    async fn write_artifact_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("doom_classes.h");

        write_artifact(&path, "first").await.unwrap();
        write_artifact(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
