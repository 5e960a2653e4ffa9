use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use engine_logging::{engine_debug, engine_info, engine_warn};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sieve_core::Entry;

use crate::{decode_body, Fetcher, SourceError};

/// Entries obtained from one upstream source, tagged with the source kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedBatch {
    pub source: &'static str,
    pub entries: Vec<Entry>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<FeedBatch, SourceError>;
}

/// RSS 2.0 or Atom syndication feed.
pub struct RssFeedSource {
    fetcher: Arc<dyn Fetcher>,
    url: String,
}

impl RssFeedSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch_entries(&self) -> Result<FeedBatch, SourceError> {
        let output = self.fetcher.fetch(&self.url).await?;
        engine_info!(
            "feed {} answered with {} bytes ({})",
            self.url,
            output.metadata.byte_len,
            output.metadata.content_type.as_deref().unwrap_or("no content type")
        );
        let decoded = decode_body(&output.bytes, output.metadata.content_type.as_deref());
        let entries = parse_feed(&decoded.text)?;
        Ok(FeedBatch {
            source: "rss",
            entries,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Published,
    Updated,
    Summary,
}

#[derive(Debug, Default)]
struct ItemDraft {
    title: String,
    link: String,
    published: String,
    updated: String,
    summary: String,
}

impl ItemDraft {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Summary => &mut self.summary,
        };
        target.push_str(text);
    }

    fn into_entry(self) -> Option<Entry> {
        let url = self.link.trim().to_string();
        if url.is_empty() {
            return None;
        }
        Some(Entry {
            url,
            title: self.title.trim().to_string(),
            published_at: parse_date(self.published.trim())
                .or_else(|| parse_date(self.updated.trim())),
            summary: self.summary.trim().to_string(),
        })
    }
}

fn field_for(element: &BytesStart<'_>, draft: &ItemDraft) -> Option<Field> {
    match element.local_name().as_ref() {
        b"title" if draft.title.is_empty() => Some(Field::Title),
        b"link" if draft.link.is_empty() => Some(Field::Link),
        b"pubDate" | b"published" if draft.published.is_empty() => Some(Field::Published),
        b"updated" | b"date" if draft.updated.is_empty() => Some(Field::Updated),
        b"description" | b"summary" if draft.summary.is_empty() => Some(Field::Summary),
        _ => None,
    }
}

fn atom_href(element: &BytesStart<'_>) -> Option<String> {
    let rel = element
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()));
    if rel.as_deref().is_some_and(|rel| rel != "alternate") {
        return None;
    }
    element
        .try_get_attribute("href")
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parses `<item>` (RSS) and `<entry>` (Atom) elements. Items without a link are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<Entry>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut draft: Option<ItemDraft> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                let name = element.local_name();
                if matches!(name.as_ref(), b"item" | b"entry") {
                    draft = Some(ItemDraft::default());
                    field = None;
                } else if let Some(current) = draft.as_mut() {
                    field = field_for(&element, current);
                    if field == Some(Field::Link) {
                        if let Some(href) = atom_href(&element) {
                            current.link = href;
                        }
                    }
                }
            }
            Ok(Event::Empty(element)) => {
                if let Some(current) = draft.as_mut() {
                    if element.local_name().as_ref() == b"link" && current.link.is_empty() {
                        if let Some(href) = atom_href(&element) {
                            current.link = href;
                        }
                    }
                }
            }
            Ok(Event::Text(text)) => {
                if let (Some(current), Some(active)) = (draft.as_mut(), field) {
                    // The HTML entity table covers the XML predefined ones as well.
                    let text = match text.unescape_with(resolve_html5_entity) {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            engine_warn!("keeping raw feed text after entity error: {}", err);
                            String::from_utf8_lossy(&text).into_owned()
                        }
                    };
                    current.push(active, &text);
                }
            }
            Ok(Event::CData(data)) => {
                if let (Some(current), Some(active)) = (draft.as_mut(), field) {
                    current.push(active, &String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::End(element)) => {
                let name = element.local_name();
                if matches!(name.as_ref(), b"item" | b"entry") {
                    if let Some(entry) = draft.take().and_then(ItemDraft::into_entry) {
                        entries.push(entry);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(SourceError::Parse(format!(
                    "at byte {}: {err}",
                    reader.buffer_position()
                )))
            }
        }
    }

    engine_debug!("parsed {} feed entries", entries.len());
    Ok(entries)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Drops entries with a repeated URL (first occurrence wins) and caps the list.
pub fn prepare_entries(entries: Vec<Entry>, max_entries: usize) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.url.clone()))
        .take(max_entries)
        .collect()
}
