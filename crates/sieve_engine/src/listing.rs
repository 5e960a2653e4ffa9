use std::collections::HashSet;
use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use scraper::{Html, Selector};
use sieve_core::Entry;
use url::Url;

use crate::visibility::visible_text;
use crate::{decode_body, FeedBatch, FeedSource, Fetcher, SourceError};

/// Article links scraped from an HTML listing page.
pub struct HtmlListingSource {
    fetcher: Arc<dyn Fetcher>,
    url: String,
    link_selector: String,
}

impl HtmlListingSource {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        url: impl Into<String>,
        link_selector: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            url: url.into(),
            link_selector: link_selector.into(),
        }
    }
}

#[async_trait::async_trait]
impl FeedSource for HtmlListingSource {
    async fn fetch_entries(&self) -> Result<FeedBatch, SourceError> {
        let output = self.fetcher.fetch(&self.url).await?;
        let decoded = decode_body(&output.bytes, output.metadata.content_type.as_deref());
        let entries =
            parse_listing(&decoded.text, &output.metadata.final_url, &self.link_selector)?;
        Ok(FeedBatch {
            source: "html_listing",
            entries,
        })
    }
}

/// Collects `link_selector` anchors as entries, resolving hrefs against `page_url`.
///
/// Fragment-only and non-http(s) links are skipped; repeated URLs keep the first anchor.
pub fn parse_listing(
    html: &str,
    page_url: &str,
    link_selector: &str,
) -> Result<Vec<Entry>, SourceError> {
    let selector = Selector::parse(link_selector)
        .map_err(|err| SourceError::Parse(format!("invalid link selector: {err:?}")))?;
    let base = Url::parse(page_url).ok();
    let doc = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for anchor in doc.select(&selector) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let resolved = match &base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        let Ok(mut url) = resolved else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        url.set_fragment(None);
        let url = url.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }
        entries.push(Entry::new(url, visible_text(*anchor)));
    }
    Ok(entries)
}

/// Uses `primary` unless it fails or comes back empty, then `fallback`.
pub struct FallbackSource {
    primary: Box<dyn FeedSource>,
    fallback: Option<Box<dyn FeedSource>>,
}

impl FallbackSource {
    pub fn new(primary: Box<dyn FeedSource>, fallback: Option<Box<dyn FeedSource>>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait::async_trait]
impl FeedSource for FallbackSource {
    async fn fetch_entries(&self) -> Result<FeedBatch, SourceError> {
        let primary_err = match self.primary.fetch_entries().await {
            Ok(batch) if !batch.entries.is_empty() || self.fallback.is_none() => return Ok(batch),
            Ok(batch) => SourceError::Empty(batch.source.to_string()),
            Err(err) => err,
        };
        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        engine_warn!("primary source unusable ({}); trying fallback", primary_err);
        match fallback.fetch_entries().await {
            Ok(batch) if !batch.entries.is_empty() => {
                engine_info!(
                    "fallback source {} supplied {} entries",
                    batch.source,
                    batch.entries.len()
                );
                Ok(batch)
            }
            Ok(_) => Err(primary_err),
            Err(err) => {
                engine_warn!("fallback source failed: {}", err);
                Err(primary_err)
            }
        }
    }
}
