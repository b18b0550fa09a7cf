// src/services/categories.rs

//! Category discovery with pagination.
//!
//! Walks the "Categories by type" table on the categories index page,
//! then paginates through each category's member listing, collecting
//! class identifiers.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::WikiConfig;
use crate::error::{AppError, Result};
use crate::models::CategoryMap;
use crate::services::WikiFetcher;
use crate::utils;

/// Identifier grammar for class names; anything else is navigation noise.
static CLASS_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

const CATEGORY_PREFIX: &str = "/wiki/Category:";
const CLASS_PREFIX: &str = "/wiki/Classes:";

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Discover categories and their member classes from the index page.
///
/// Returns `Ok(None)` when the "Categories by type" section is absent,
/// so the caller chooses the propagation policy; a failed index fetch is
/// a hard error. Member lists come back sorted and deduplicated.
pub async fn discover_categories(
    fetcher: &mut WikiFetcher,
    wiki: &WikiConfig,
) -> Result<Option<CategoryMap>> {
    let index_url = wiki.spawnable_url();
    log::info!("Fetching categories from {index_url}");

    let html = fetcher.fetch(&index_url).await?;
    let document = Html::parse_document(&html);

    let Some(links) = category_links(&document)? else {
        return Ok(None);
    };
    log::info!("Found {} category links", links.len());

    let mut categories = CategoryMap::new();
    for (name, href) in links {
        let category_url =
            utils::resolve(&index_url, &href).unwrap_or_else(|| href.clone());

        match collect_category_members(fetcher, &name, &category_url).await {
            Ok(members) if !members.is_empty() => {
                log::info!("  {name}: {} classes", members.len());
                categories.insert(name, members);
            }
            Ok(_) => log::debug!("  {name}: no classes listed"),
            Err(e) => log::warn!("Error processing category {name}: {e}"),
        }
    }

    log::info!("Extracted classes from {} categories", categories.len());
    Ok(Some(categories))
}

/// Extract (name, href) pairs from the "Categories by type" table.
/// `None` means the section was not found.
fn category_links(document: &Html) -> Result<Option<Vec<(String, String)>>> {
    let heading_sel = parse_selector("div.mw-parser-output h3")?;
    let link_sel = parse_selector("a[href]")?;

    let heading = document
        .select(&heading_sel)
        .find(|h| h.text().collect::<String>().contains("Categories by type"));
    let Some(heading) = heading else {
        return Ok(None);
    };

    let Some(table) = following_table(heading) else {
        return Ok(None);
    };

    let mut links = Vec::new();
    for link in table.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(name) = href.strip_prefix(CATEGORY_PREFIX) {
            links.push((name.to_string(), href.to_string()));
        }
    }
    Ok(Some(links))
}

/// First table at or below the siblings following a heading.
fn following_table(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let table_sel = Selector::parse("table").ok()?;

    let mut node = heading.next_sibling();
    while let Some(n) = node {
        if let Some(element) = ElementRef::wrap(n) {
            if element.value().name() == "table" {
                return Some(element);
            }
            if let Some(inner) = element.select(&table_sel).next() {
                return Some(inner);
            }
        }
        node = n.next_sibling();
    }
    None
}

/// Follow a category listing across its pages, accumulating members.
///
/// Terminates when no "next page" control is found, when the expected
/// containers are absent, or when a page would be visited twice.
async fn collect_category_members(
    fetcher: &mut WikiFetcher,
    name: &str,
    category_url: &str,
) -> Result<Vec<String>> {
    let mut members: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut next_url = Some(category_url.to_string());

    while let Some(url) = next_url {
        if !visited.insert(url.clone()) {
            log::warn!("Pagination loop detected for {name} at {url}");
            break;
        }

        let html = fetcher.fetch(&url).await?;
        let document = Html::parse_document(&html);
        let Some(page) = extract_member_page(&document)? else {
            break;
        };

        members.extend(page.members);
        next_url = match page.next_href {
            Some(href) => {
                log::debug!("    Fetching next page for {name}...");
                Some(utils::resolve(&url, &href).unwrap_or(href))
            }
            None => None,
        };
    }

    members.sort();
    members.dedup();
    Ok(members)
}

/// A single parsed category listing page.
struct MemberPage {
    members: Vec<String>,
    next_href: Option<String>,
}

/// Extract member identifiers and the "next page" href from one listing
/// page. `None` when the expected containers are absent, which ends
/// pagination without error.
fn extract_member_page(document: &Html) -> Result<Option<MemberPage>> {
    let generated_sel = parse_selector("div.mw-category-generated")?;
    let pages_sel = parse_selector("div#mw-pages")?;
    let link_sel = parse_selector("a[href]")?;

    let Some(generated) = document.select(&generated_sel).next() else {
        return Ok(None);
    };
    let Some(pages) = generated.select(&pages_sel).next() else {
        return Ok(None);
    };

    let mut members = Vec::new();
    for link in pages.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(class_name) = href.strip_prefix(CLASS_PREFIX) {
            if CLASS_NAME_RE.is_match(class_name) {
                members.push(class_name.to_string());
            }
        }
    }

    let next_href = generated.select(&link_sel).find_map(|link| {
        let href = link.value().attr("href")?;
        let text = link.text().collect::<String>().to_lowercase();
        (href.contains("pagefrom=") && text.contains("next page")).then(|| href.to_string())
    });

    Ok(Some(MemberPage { members, next_href }))
}
