use crate::PageError;

/// Opens a rendered view of one URL.
///
/// Every call must produce an isolated view; views are never shared between
/// URLs and are released when dropped.
#[async_trait::async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Box<dyn PageView>, PageError>;
}

/// Visibility and text queries over a loaded page.
///
/// "Visible" means rendered to the reader, not merely present in the markup.
#[async_trait::async_trait]
pub trait PageView: Send + Sync {
    async fn is_phrase_visible(&self, phrase: &str) -> Result<bool, PageError>;

    /// Maximum visible word count across the selectors.
    async fn visible_word_count(&self, selectors: &[String]) -> Result<usize, PageError>;

    async fn has_visible_input(&self, kind: &str) -> Result<bool, PageError>;

    async fn has_visible_container(&self, role: &str) -> Result<bool, PageError>;

    async fn simulate_scroll_and_wait(&self) -> Result<(), PageError>;
}
