// src/services/classes.rs

//! Canonical class list extraction.
//!
//! The class index page lists every Doom actor class inside `<pre>`
//! blocks; this is used as a cross-check against the flattened category
//! universe and as the source order for metadata lookups.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::services::WikiFetcher;

static CLASS_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

const CLASS_PREFIX: &str = "/wiki/Classes:";

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Fetch the canonical class list from the class index page.
///
/// A missing content area is a hard error here: this is a top-level
/// index page, and without it there is no class universe to check.
pub async fn fetch_class_list(fetcher: &mut WikiFetcher, url: &str) -> Result<Vec<String>> {
    let html = fetcher.fetch(url).await?;
    let document = Html::parse_document(&html);

    extract_class_list(&document)?
        .ok_or_else(|| AppError::discovery(format!("Could not find main content area at {url}")))
}

/// Extract class names from `<pre>` blocks inside the main content area.
/// `None` when the content area itself is absent.
fn extract_class_list(document: &Html) -> Result<Option<Vec<String>>> {
    let content_sel = parse_selector("div#mw-content-text")?;
    let pre_link_sel = parse_selector("pre a[href]")?;

    let Some(content) = document.select(&content_sel).next() else {
        return Ok(None);
    };

    let mut class_names = Vec::new();
    for link in content.select(&pre_link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(class_name) = href.strip_prefix(CLASS_PREFIX) {
            if CLASS_NAME_RE.is_match(class_name) {
                class_names.push(class_name.to_string());
            }
        }
    }

    class_names.sort();
    class_names.dedup();
    Ok(Some(class_names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_sorted_unique_classes() {
        let html = r#"
            <div id="mw-content-text">
              <pre>
                <a href="/wiki/Classes:ZombieMan">ZombieMan</a>
                <a href="/wiki/Classes:Cacodemon">Cacodemon</a>
                <a href="/wiki/Classes:Cacodemon">Cacodemon</a>
                <a href="/wiki/Classes:Not%20Valid">Not valid</a>
              </pre>
              <a href="/wiki/Classes:OutsidePre">outside pre</a>
            </div>"#;
        let document = Html::parse_document(html);
        let classes = extract_class_list(&document).unwrap().unwrap();
        assert_eq!(classes, vec!["Cacodemon", "ZombieMan"]);
    }

    #[test]
    fn missing_content_area_is_none() {
        let document = Html::parse_document("<div id=\"other\"></div>");
        assert!(extract_class_list(&document).unwrap().is_none());
    }
}
