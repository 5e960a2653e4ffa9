use std::panic::AssertUnwindSafe;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::FutureExt;
use sieve_core::Verdict;

use crate::signals::{BodyLengthProbe, CheckBudget, EmailGateSignal, GateSignal, VisiblePhraseSignal};
use crate::{CheckStage, PageError, PageLoader, PageView};

pub const DEFAULT_MIN_VISIBLE_WORDS: usize = 700;

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Bounds the whole load, including the loader's initial settle.
    pub load_timeout: Duration,
    /// Bounds each visibility or word-count query.
    pub check_timeout: Duration,
    /// Bounds the scroll-and-settle step.
    pub scroll_timeout: Duration,
    pub gate_phrases: Vec<String>,
    pub cta_phrases: Vec<String>,
    pub body_selectors: Vec<String>,
    pub min_visible_words: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(40),
            check_timeout: Duration::from_secs(2),
            scroll_timeout: Duration::from_secs(5),
            gate_phrases: to_strings(&[
                "Finish reading this article for free",
                "Enter your email",
                "Get it Now",
                "Already a subscriber? Log In",
                "This article is part of our premium archives",
                "To continue reading and get full access",
                "Get unlimited access to all Foreign Affairs",
            ]),
            cta_phrases: to_strings(&["Get it Now", "Finish reading this article for free"]),
            body_selectors: to_strings(&["article p", "main article p", "main p"]),
            min_visible_words: DEFAULT_MIN_VISIBLE_WORDS,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

enum PassOutcome {
    Gated(String),
    Clean { words: usize },
}

/// Layered free/gated judgment for a single page.
///
/// Signals run in order and the first hit decides. A clean pass is repeated
/// after a scroll because some gates render lazily; FREE needs both passes clean.
pub struct GateClassifier {
    signals: Vec<Box<dyn GateSignal>>,
    body: BodyLengthProbe,
    settings: ClassifierSettings,
}

impl GateClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        let signals: Vec<Box<dyn GateSignal>> = vec![
            Box::new(VisiblePhraseSignal::new(settings.gate_phrases.clone())),
            Box::new(EmailGateSignal::new(settings.cta_phrases.clone())),
        ];
        let body = BodyLengthProbe::new(settings.body_selectors.clone(), settings.min_visible_words);
        Self {
            signals,
            body,
            settings,
        }
    }

    /// Appends a signal evaluated after the built-in ones.
    pub fn with_signal(mut self, signal: Box<dyn GateSignal>) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn signal_names(&self) -> Vec<&'static str> {
        self.signals.iter().map(|signal| signal.name()).collect()
    }

    /// Classifies `url`, turning any failure into a gated verdict.
    pub async fn classify(&self, loader: &dyn PageLoader, url: &str) -> Verdict {
        match self.check(loader, url).await {
            Ok(verdict) => verdict,
            Err(err) => fail_closed(url, &err),
        }
    }

    /// Classifies `url`, surfacing load and inspection failures.
    ///
    /// A panic inside a loader or view is reported as [`PageError::Internal`].
    pub async fn check(&self, loader: &dyn PageLoader, url: &str) -> Result<Verdict, PageError> {
        AssertUnwindSafe(self.check_inner(loader, url))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(PageError::Internal("page check panicked".to_string())))
    }

    async fn check_inner(&self, loader: &dyn PageLoader, url: &str) -> Result<Verdict, PageError> {
        let view = tokio::time::timeout(self.settings.load_timeout, loader.load(url))
            .await
            .map_err(|_| PageError::Timeout(CheckStage::Load))??;

        if let PassOutcome::Gated(reason) = self.inspect(view.as_ref()).await? {
            return Ok(Verdict::gated(reason));
        }

        tokio::time::timeout(self.settings.scroll_timeout, view.simulate_scroll_and_wait())
            .await
            .map_err(|_| PageError::Timeout(CheckStage::Scroll))??;

        let verdict = match self.inspect(view.as_ref()).await? {
            PassOutcome::Gated(reason) => Verdict::gated(format!("{reason}_after_scroll")),
            PassOutcome::Clean { words } => Verdict::free(format!("free_open_words={words}")),
        };
        engine_debug!("{} -> {} ({})", url, verdict.status, verdict.reason);
        Ok(verdict)
    }

    async fn inspect(&self, view: &dyn PageView) -> Result<PassOutcome, PageError> {
        let budget = CheckBudget {
            per_check: self.settings.check_timeout,
        };
        for signal in &self.signals {
            if let Some(reason) = signal.evaluate(view, &budget).await? {
                return Ok(PassOutcome::Gated(reason));
            }
        }

        let words = self.body.measure(view, &budget).await?;
        if words < self.body.min_words() {
            return Ok(PassOutcome::Gated(format!("content_too_short_words={words}")));
        }
        Ok(PassOutcome::Clean { words })
    }
}

/// The verdict for a page that could not be verified.
pub fn fail_closed(url: &str, err: &PageError) -> Verdict {
    engine_warn!("check failed for {}: {}", url, err);
    Verdict::gated(err.reason_code())
}
