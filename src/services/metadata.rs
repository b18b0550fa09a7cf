// src/services/metadata.rs

//! Per-class metadata mining.
//!
//! Visits each class page and scans its two-column tables for the
//! DoomEd (editor) number, Spawn ID, and Identifier rows. This is the
//! only path that throttles: every uncached page fetch is preceded by a
//! mandatory delay.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};

use crate::config::WikiConfig;
use crate::error::{AppError, Result};
use crate::models::ClassMetadata;
use crate::services::WikiFetcher;

/// First standalone run of digits in a value cell.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)\b").unwrap());

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Fetch metadata for each class, in the given order.
///
/// The delay is owed before every network fetch, never for cache hits,
/// and is not bypassed by force-refresh. One class's failure is logged
/// and skipped; it never aborts the batch.
pub async fn fetch_class_metadata(
    fetcher: &mut WikiFetcher,
    wiki: &WikiConfig,
    class_names: &[String],
    delay: Duration,
) -> Result<BTreeMap<String, ClassMetadata>> {
    let mut metadata = BTreeMap::new();

    for class_name in class_names {
        let url = wiki.class_url(class_name);

        if !fetcher.is_cached(&url).await {
            tokio::time::sleep(delay).await;
        }

        let html = match fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Failed to fetch data for {class_name}: {e}");
                continue;
            }
        };

        let document = Html::parse_document(&html);
        match extract_metadata(&document) {
            Ok(Some(meta)) => {
                if !meta.is_empty() {
                    metadata.insert(class_name.clone(), meta);
                }
            }
            Ok(None) => log::debug!("No content area for {class_name}"),
            Err(e) => log::warn!("Error processing {class_name}: {e}"),
        }
    }

    Ok(metadata)
}

/// Scan every table row under the content area for (header, value)
/// cell pairs. `None` when the content area is absent.
fn extract_metadata(document: &Html) -> Result<Option<ClassMetadata>> {
    let content_sel = parse_selector("div#mw-content-text")?;
    let row_sel = parse_selector("table tr")?;
    let cell_sel = parse_selector("td, th")?;

    let Some(content) = document.select(&content_sel).next() else {
        return Ok(None);
    };

    let mut meta = ClassMetadata::default();
    for row in content.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        for pair in cells.chunks(2) {
            let [header, value] = pair else {
                continue;
            };
            classify_cell_pair(header, value, &mut meta);
        }
    }

    Ok(Some(meta))
}

/// Match a header cell against the three known attribute patterns.
fn classify_cell_pair(header: &str, value: &str, meta: &mut ClassMetadata) {
    let header = header.to_lowercase();

    if header.contains("doomed") || header.contains("editor number") {
        if let Some(number) = first_number(value) {
            meta.editor_id = Some(number);
        }
    } else if header.contains("spawn") && header.contains("id") {
        if let Some(number) = first_number(value) {
            meta.spawn_id = Some(number);
        }
    } else if header.contains("identifier") {
        meta.identifier = Some(value.to_string());
    }
}

fn first_number(value: &str) -> Option<u32> {
    NUMBER_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
