use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use scraper::{ElementRef, Html, Selector};

use crate::visibility::{is_rendered, visible_text};
use crate::{decode_body, Fetcher, PageError, PageLoader, PageView};

#[derive(Debug, Clone)]
pub struct PageSettings {
    /// Wait after the document arrives, before the first inspection pass.
    pub initial_settle: Duration,
    /// Wait performed by `simulate_scroll_and_wait`.
    pub scroll_settle: Duration,
    /// Matched elements counted per body selector.
    pub max_counted_elements: usize,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            initial_settle: Duration::from_millis(2000),
            scroll_settle: Duration::from_millis(900),
            max_counted_elements: 120,
        }
    }
}

/// Loads pages over HTTP and inspects the served markup without executing scripts.
pub struct HttpPageLoader {
    fetcher: Arc<dyn Fetcher>,
    settings: PageSettings,
}

impl HttpPageLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: PageSettings) -> Self {
        Self { fetcher, settings }
    }
}

#[async_trait::async_trait]
impl PageLoader for HttpPageLoader {
    async fn load(&self, url: &str) -> Result<Box<dyn PageView>, PageError> {
        let output = self.fetcher.fetch(url).await?;
        let decoded = decode_body(&output.bytes, output.metadata.content_type.as_deref());
        if decoded.lossy {
            engine_warn!(
                "page {} had invalid {} sequences; inspecting lossy text",
                url,
                decoded.encoding_label
            );
        }
        engine_debug!(
            "loaded {} ({} bytes, {} redirects)",
            output.metadata.final_url,
            output.metadata.byte_len,
            output.metadata.redirect_count
        );

        tokio::time::sleep(self.settings.initial_settle).await;

        Ok(Box::new(StaticPage::new(decoded.text, self.settings.clone())))
    }
}

/// A served HTML document.
///
/// The markup is re-parsed for every query: the parsed tree is not `Send` and
/// the queries per page are few.
#[derive(Debug, Clone)]
pub struct StaticPage {
    html: String,
    settings: PageSettings,
}

impl StaticPage {
    pub fn new(html: impl Into<String>, settings: PageSettings) -> Self {
        Self {
            html: html.into(),
            settings,
        }
    }

    /// Whitespace-collapsed text a reader would see.
    pub fn visible_text(&self) -> String {
        let doc = Html::parse_document(&self.html);
        visible_text(*doc.root_element())
    }

    pub fn phrase_visible(&self, phrase: &str) -> bool {
        let needle = normalize(phrase);
        if needle.is_empty() {
            return false;
        }
        normalize(&self.visible_text()).contains(&needle)
    }

    pub fn word_count(&self, selectors: &[String]) -> Result<usize, PageError> {
        let doc = Html::parse_document(&self.html);
        let mut best = 0;
        for raw in selectors {
            let selector = Selector::parse(raw).map_err(|err| {
                PageError::Internal(format!("invalid body selector {raw:?}: {err:?}"))
            })?;
            let total: usize = doc
                .select(&selector)
                .filter(|element| is_rendered(**element))
                .take(self.settings.max_counted_elements)
                .map(|element| visible_text(*element).split_whitespace().count())
                .sum();
            best = best.max(total);
        }
        Ok(best)
    }

    pub fn input_visible(&self, kind: &str) -> bool {
        let doc = Html::parse_document(&self.html);
        any_rendered(&doc, "input", |element| {
            element
                .value()
                .attr("type")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case(kind))
        })
    }

    pub fn container_visible(&self, role: &str) -> bool {
        let doc = Html::parse_document(&self.html);
        let by_role = any_rendered(&doc, "[role]", |element| {
            element.value().attr("role").is_some_and(|roles| {
                roles
                    .split_whitespace()
                    .any(|candidate| candidate.eq_ignore_ascii_case(role))
            })
        });
        by_role
            || (role.eq_ignore_ascii_case("dialog")
                && any_rendered(&doc, "dialog[open]", |_| true))
    }
}

fn any_rendered(doc: &Html, css: &str, matches: impl Fn(&ElementRef<'_>) -> bool) -> bool {
    let Ok(selector) = Selector::parse(css) else {
        return false;
    };
    doc.select(&selector)
        .any(|element| matches(&element) && is_rendered(*element))
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[async_trait::async_trait]
impl PageView for StaticPage {
    async fn is_phrase_visible(&self, phrase: &str) -> Result<bool, PageError> {
        Ok(self.phrase_visible(phrase))
    }

    async fn visible_word_count(&self, selectors: &[String]) -> Result<usize, PageError> {
        self.word_count(selectors)
    }

    async fn has_visible_input(&self, kind: &str) -> Result<bool, PageError> {
        Ok(self.input_visible(kind))
    }

    async fn has_visible_container(&self, role: &str) -> Result<bool, PageError> {
        Ok(self.container_visible(role))
    }

    // Served markup cannot render lazily; only the settle time is reproduced.
    async fn simulate_scroll_and_wait(&self) -> Result<(), PageError> {
        tokio::time::sleep(self.settings.scroll_settle).await;
        Ok(())
    }
}
