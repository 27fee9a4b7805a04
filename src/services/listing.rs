//! Location records scraped from listing page markup.
//!
//! A listing page marks up each location as an element carrying
//! `nj-locator-element="list-item"`. Inside an item, elements marked
//! `latitude`, `longitude` and `address` hold plain text. Paginated listings
//! render a `w-pagination-wrapper` block and a `w-page-count` element whose
//! text reads `"<current> / <total>"`.

use crate::models::{CoordinateField, LocationRecord};
use futures::{stream, StreamExt, TryStreamExt};
use regex::{Match, Regex};
use reqwest::Client;
use std::ops::Range;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

static LIST_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex("list"));
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex("list-item"));
static LATITUDE_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex("latitude"));
static LONGITUDE_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex("longitude"));
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex("address"));

static PAGINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*["'][^"']*\bw-pagination-wrapper\b"#).expect("valid regex")
});

static PAGE_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<([a-z][a-z0-9]*)\b[^>]*\bclass\s*=\s*["'][^"']*\bw-page-count\b[^"']*["'][^>]*>"#)
        .expect("valid regex")
});

// Any opening or closing tag; group 3 holds the slash of `<br/>`-style tags
static ELEMENT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*?(/?)>").expect("valid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Opening tag of an element marked `nj-locator-element="{name}"`, tag name in group 1
fn marker_regex(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9]*)\b[^>]*\bnj-locator-element\s*=\s*["']{name}["'][^>]*>"#
    ))
    .expect("valid regex")
}

/// Maximum number of pages fetched for one listing
pub const DEFAULT_MAX_PAGES: usize = 50;

/// Errors that can occur while collecting listing records
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Listing page returned error: {0}")]
    ApiError(String),

    #[error("No list items found on {0}")]
    NoItems(String),

    #[error("Invalid page count: {0}")]
    PageCount(String),
}

/// Extract the location records of one listing page
///
/// Only items inside the list container are read, and each field is looked
/// up inside its own item. Record ids are `"{page}-{index}"` with a
/// zero-based index. Coordinates are kept as text so that bad values surface
/// during ranking.
pub fn parse_list_items(html: &str, page: usize) -> Vec<LocationRecord> {
    let Some(list) = first_element_body(&LIST_RE, html) else {
        return Vec::new();
    };

    element_bodies(&LIST_ITEM_RE, list)
        .into_iter()
        .enumerate()
        .map(|(index, item)| LocationRecord {
            id: Some(format!("{}-{}", page, index)),
            address: field_text(&ADDRESS_RE, item),
            latitude: field_text(&LATITUDE_RE, item).map(CoordinateField::Text),
            longitude: field_text(&LONGITUDE_RE, item).map(CoordinateField::Text),
            payload: serde_json::Value::Null,
        })
        .collect()
}

/// Whether the page renders pagination controls
pub fn is_paginated(html: &str) -> bool {
    PAGINATION_RE.is_match(html)
}

/// Read the total page count from the `"<current> / <total>"` indicator
pub fn parse_page_count(html: &str) -> Result<usize, ListingError> {
    let text = first_element_body(&PAGE_COUNT_RE, html)
        .map(clean_text)
        .ok_or_else(|| ListingError::PageCount("no page count element found".into()))?;

    let (current, total) = text
        .split_once('/')
        .ok_or_else(|| ListingError::PageCount(format!("unexpected text '{}'", text)))?;

    let parse = |value: &str| {
        value
            .trim()
            .parse::<usize>()
            .map_err(|_| ListingError::PageCount(format!("unexpected text '{}'", text)))
    };

    parse(current)?;
    let total = parse(total)?;
    if total == 0 {
        return Err(ListingError::PageCount("page count is zero".into()));
    }

    Ok(total)
}

/// URL of a listing page, e.g. `https://site/stores?page=2`
pub fn page_url(base_url: &str, page: usize) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", base_url, separator, page)
}

fn field_text(re: &Regex, item: &str) -> Option<String> {
    first_element_body(re, item)
        .map(clean_text)
        .filter(|text| !text.is_empty())
}

fn first_element_body<'h>(re: &Regex, html: &'h str) -> Option<&'h str> {
    let cap = re.captures(html)?;
    let body = element_body(html, cap.get(0)?, cap.get(1)?.as_str());
    Some(&html[body])
}

/// Bodies of every element opened by `re`, outermost first and without overlap
fn element_bodies<'h>(re: &Regex, html: &'h str) -> Vec<&'h str> {
    let mut bodies = Vec::new();
    let mut from = 0;

    while let Some(cap) = re.captures_at(html, from) {
        let (Some(open), Some(name)) = (cap.get(0), cap.get(1)) else {
            break;
        };
        let body = element_body(html, open, name.as_str());
        from = body.end.max(open.end());
        bodies.push(&html[body]);
    }

    bodies
}

/// Byte range between an opening tag and its matching close tag
///
/// Nested elements with the same tag name are balanced. An element that is
/// never closed runs to the end of `html`.
fn element_body(html: &str, open: Match<'_>, name: &str) -> Range<usize> {
    let start = open.end();
    if open.as_str().ends_with("/>") {
        return start..start;
    }

    let mut depth = 1usize;
    for tag in ELEMENT_TAG_RE.captures_iter(&html[start..]) {
        let (Some(whole), Some(tag_name)) = (tag.get(0), tag.get(2)) else {
            continue;
        };
        if !tag_name.as_str().eq_ignore_ascii_case(name) || &tag[3] == "/" {
            continue;
        }

        if tag[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return start..start + whole.start();
            }
        }
    }

    start..html.len()
}

fn clean_text(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Listing page client
///
/// Collects location records from a listing page and, when it is paginated,
/// from every other page of the same listing.
pub struct ListingClient {
    page_url: String,
    max_concurrent_pages: usize,
    max_pages: usize,
    client: Client,
}

impl ListingClient {
    /// Create a new listing client
    pub fn new(
        page_url: String,
        max_concurrent_pages: usize,
        timeout: Duration,
    ) -> Result<Self, ListingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            page_url,
            max_concurrent_pages: max_concurrent_pages.max(1),
            max_pages: DEFAULT_MAX_PAGES,
            client,
        })
    }

    /// Refuse listings that report more than `max_pages` pages
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Fetch and merge the records of every listing page, in page order
    pub async fn fetch_all_records(&self) -> Result<Vec<LocationRecord>, ListingError> {
        let first = self.fetch_html(&self.page_url).await?;

        let mut pages = vec![first];

        if is_paginated(&pages[0]) {
            let total = parse_page_count(&pages[0])?;
            if total > self.max_pages {
                return Err(ListingError::PageCount(format!(
                    "{} pages exceeds the limit of {}",
                    total, self.max_pages
                )));
            }
            tracing::debug!("Listing {} has {} pages", self.page_url, total);

            let rest: Vec<String> = stream::iter(2..=total)
                .map(|page| {
                    let url = page_url(&self.page_url, page);
                    async move { self.fetch_html(&url).await }
                })
                .buffered(self.max_concurrent_pages)
                .try_collect()
                .await?;

            pages.extend(rest);
        }

        let records: Vec<LocationRecord> = pages
            .iter()
            .enumerate()
            .flat_map(|(index, html)| parse_list_items(html, index + 1))
            .collect();

        if records.is_empty() {
            return Err(ListingError::NoItems(self.page_url.clone()));
        }

        tracing::info!("Collected {} records from {} listing page(s)", records.len(), pages.len());

        Ok(records)
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ListingError> {
        tracing::debug!("Fetching listing page: {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ListingError::ApiError(format!(
                "Failed to fetch {}: {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}
