#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use sieve_engine::{
    ClassifierSettings, FailureKind, FeedBatch, FeedSource, FetchError, PageError, PageLoader,
    PageSettings, PageView, SourceError, StaticPage,
};
use sieve_core::Entry;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// An article whose body holds `words` visible words, plus extra markup.
pub fn article(words: usize, extra: &str) -> String {
    let body = vec!["word"; words].join(" ");
    format!(
        "<html><head><title>T</title></head><body><main><article>\
         <h1>Headline</h1><p>{body}</p>{extra}</article></main></body></html>"
    )
}

pub fn instant_pages() -> PageSettings {
    PageSettings {
        initial_settle: Duration::ZERO,
        scroll_settle: Duration::ZERO,
        max_counted_elements: 120,
    }
}

pub fn quick_classifier_settings() -> ClassifierSettings {
    ClassifierSettings {
        load_timeout: Duration::from_millis(300),
        check_timeout: Duration::from_millis(150),
        scroll_timeout: Duration::from_millis(300),
        ..ClassifierSettings::default()
    }
}

pub fn http_error(status: u16) -> PageError {
    PageError::Fetch(FetchError {
        kind: FailureKind::HttpStatus(status),
        message: format!("status {status}"),
    })
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Html(String),
    /// Serves `before` until the view is scrolled, then `after`.
    Lazy { before: String, after: String },
    LoadError(PageError),
    HangOnLoad,
    HangOnCheck,
    Panic,
}

#[derive(Default)]
pub struct FakeLoader {
    pages: Mutex<HashMap<String, Behavior>>,
    loads: AtomicUsize,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &str, behavior: Behavior) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), behavior);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PageLoader for FakeLoader {
    async fn load(&self, url: &str) -> Result<Box<dyn PageView>, PageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let behavior = self.pages.lock().unwrap().get(url).cloned();
        match behavior {
            None => Err(http_error(404)),
            Some(Behavior::Html(html)) => Ok(Box::new(StaticPage::new(html, instant_pages()))),
            Some(Behavior::Lazy { before, after }) => Ok(Box::new(LazyView {
                before: StaticPage::new(before, instant_pages()),
                after: StaticPage::new(after, instant_pages()),
                scrolled: AtomicBool::new(false),
            })),
            Some(Behavior::LoadError(err)) => Err(err),
            Some(Behavior::HangOnLoad) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(PageError::Internal("hang ended".into()))
            }
            Some(Behavior::HangOnCheck) => Ok(Box::new(HangingView)),
            Some(Behavior::Panic) => Ok(Box::new(PanickingView)),
        }
    }
}

struct LazyView {
    before: StaticPage,
    after: StaticPage,
    scrolled: AtomicBool,
}

impl LazyView {
    fn current(&self) -> &StaticPage {
        if self.scrolled.load(Ordering::SeqCst) {
            &self.after
        } else {
            &self.before
        }
    }
}

#[async_trait::async_trait]
impl PageView for LazyView {
    async fn is_phrase_visible(&self, phrase: &str) -> Result<bool, PageError> {
        Ok(self.current().phrase_visible(phrase))
    }

    async fn visible_word_count(&self, selectors: &[String]) -> Result<usize, PageError> {
        self.current().word_count(selectors)
    }

    async fn has_visible_input(&self, kind: &str) -> Result<bool, PageError> {
        Ok(self.current().input_visible(kind))
    }

    async fn has_visible_container(&self, role: &str) -> Result<bool, PageError> {
        Ok(self.current().container_visible(role))
    }

    async fn simulate_scroll_and_wait(&self) -> Result<(), PageError> {
        self.scrolled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct HangingView;

#[async_trait::async_trait]
impl PageView for HangingView {
    async fn is_phrase_visible(&self, _phrase: &str) -> Result<bool, PageError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(false)
    }

    async fn visible_word_count(&self, _selectors: &[String]) -> Result<usize, PageError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(10_000)
    }

    async fn has_visible_input(&self, _kind: &str) -> Result<bool, PageError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(false)
    }

    async fn has_visible_container(&self, _role: &str) -> Result<bool, PageError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(false)
    }

    async fn simulate_scroll_and_wait(&self) -> Result<(), PageError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

struct PanickingView;

#[async_trait::async_trait]
impl PageView for PanickingView {
    async fn is_phrase_visible(&self, _phrase: &str) -> Result<bool, PageError> {
        panic!("renderer crashed");
    }

    async fn visible_word_count(&self, _selectors: &[String]) -> Result<usize, PageError> {
        panic!("renderer crashed");
    }

    async fn has_visible_input(&self, _kind: &str) -> Result<bool, PageError> {
        panic!("renderer crashed");
    }

    async fn has_visible_container(&self, _role: &str) -> Result<bool, PageError> {
        panic!("renderer crashed");
    }

    async fn simulate_scroll_and_wait(&self) -> Result<(), PageError> {
        panic!("renderer crashed");
    }
}

/// Returns the same canned result on every call.
pub struct StaticSource {
    result: Result<Vec<Entry>, SourceError>,
}

impl StaticSource {
    pub fn entries(entries: Vec<Entry>) -> Self {
        Self {
            result: Ok(entries),
        }
    }

    pub fn failing(err: SourceError) -> Self {
        Self { result: Err(err) }
    }
}

#[async_trait::async_trait]
impl FeedSource for StaticSource {
    async fn fetch_entries(&self) -> Result<FeedBatch, SourceError> {
        self.result.clone().map(|entries| FeedBatch {
            source: "static",
            entries,
        })
    }
}

pub fn entry(url: &str) -> Entry {
    Entry::new(url, format!("Title {url}"))
}
