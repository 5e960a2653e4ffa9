use std::future::Future;
use std::time::Duration;

use crate::{CheckStage, PageError, PageView};

/// Bounds every single query a signal makes against a page.
#[derive(Debug, Clone, Copy)]
pub struct CheckBudget {
    pub per_check: Duration,
}

impl CheckBudget {
    pub async fn bounded<T>(
        &self,
        check: impl Future<Output = Result<T, PageError>>,
    ) -> Result<T, PageError> {
        tokio::time::timeout(self.per_check, check)
            .await
            .map_err(|_| PageError::Timeout(CheckStage::Signal))?
    }
}

/// One named gate heuristic. `Some(reason)` means the page is gated.
#[async_trait::async_trait]
pub trait GateSignal: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        view: &dyn PageView,
        budget: &CheckBudget,
    ) -> Result<Option<String>, PageError>;
}

const PHRASE_REASON_CHARS: usize = 60;

/// Known gate copy, counted only when rendered.
pub struct VisiblePhraseSignal {
    phrases: Vec<String>,
}

impl VisiblePhraseSignal {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }
}

#[async_trait::async_trait]
impl GateSignal for VisiblePhraseSignal {
    fn name(&self) -> &'static str {
        "visible_phrase"
    }

    async fn evaluate(
        &self,
        view: &dyn PageView,
        budget: &CheckBudget,
    ) -> Result<Option<String>, PageError> {
        for phrase in &self.phrases {
            if budget.bounded(view.is_phrase_visible(phrase)).await? {
                let shown: String = phrase.chars().take(PHRASE_REASON_CHARS).collect();
                return Ok(Some(format!("visible_phrase:{shown}")));
            }
        }
        Ok(None)
    }
}

/// A visible email field, corroborated by a dialog or a call-to-action phrase.
///
/// The bare input is not enough: newsletter boxes in footers carry one too.
pub struct EmailGateSignal {
    cta_phrases: Vec<String>,
}

impl EmailGateSignal {
    pub fn new(cta_phrases: Vec<String>) -> Self {
        Self { cta_phrases }
    }
}

#[async_trait::async_trait]
impl GateSignal for EmailGateSignal {
    fn name(&self) -> &'static str {
        "email_gate"
    }

    async fn evaluate(
        &self,
        view: &dyn PageView,
        budget: &CheckBudget,
    ) -> Result<Option<String>, PageError> {
        if !budget.bounded(view.has_visible_input("email")).await? {
            return Ok(None);
        }
        if budget.bounded(view.has_visible_container("dialog")).await? {
            return Ok(Some("email_gate_visible_dialog".to_string()));
        }
        for phrase in &self.cta_phrases {
            if budget.bounded(view.is_phrase_visible(phrase)).await? {
                return Ok(Some("email_gate_visible_cta".to_string()));
            }
        }
        Ok(None)
    }
}

/// Positive proof of an open article: enough visible body text.
pub struct BodyLengthProbe {
    selectors: Vec<String>,
    min_words: usize,
}

impl BodyLengthProbe {
    pub fn new(selectors: Vec<String>, min_words: usize) -> Self {
        Self {
            selectors,
            min_words,
        }
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }

    pub async fn measure(
        &self,
        view: &dyn PageView,
        budget: &CheckBudget,
    ) -> Result<usize, PageError> {
        budget
            .bounded(view.visible_word_count(&self.selectors))
            .await
    }
}
