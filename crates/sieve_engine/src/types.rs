use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl FailureKind {
    /// Short token used inside verdict reason codes.
    pub fn code(&self) -> String {
        match self {
            FailureKind::InvalidUrl => "invalid_url".into(),
            FailureKind::HttpStatus(code) => format!("http_{code}"),
            FailureKind::Timeout => "timeout".into(),
            FailureKind::RedirectLimitExceeded => "redirects".into(),
            FailureKind::TooLarge { .. } => "too_large".into(),
            FailureKind::UnsupportedContentType { .. } => "content_type".into(),
            FailureKind::Network => "network".into(),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Which bounded wait of a page check ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStage {
    Load,
    Signal,
    Scroll,
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStage::Load => write!(f, "load"),
            CheckStage::Signal => write!(f, "check"),
            CheckStage::Scroll => write!(f, "scroll"),
        }
    }
}

/// Failure while loading or inspecting a page. Every variant classifies as gated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page fetch failed: {0}")]
    Fetch(FetchError),
    #[error("timed out during {0}")]
    Timeout(CheckStage),
    #[error("page inspection failed: {0}")]
    Internal(String),
}

impl PageError {
    pub fn reason_code(&self) -> String {
        match self {
            PageError::Fetch(err) if err.kind == FailureKind::Timeout => {
                "fetch_timeout_drop".to_string()
            }
            PageError::Fetch(err) => format!("fetch_error_drop_{}", err.kind.code()),
            PageError::Timeout(stage) => format!("render_timeout_drop_{stage}"),
            PageError::Internal(_) => "classifier_error_drop".to_string(),
        }
    }
}

impl From<FetchError> for PageError {
    fn from(err: FetchError) -> Self {
        PageError::Fetch(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("source could not be parsed: {0}")]
    Parse(String),
    #[error("source {0} returned no entries")]
    Empty(String),
}
