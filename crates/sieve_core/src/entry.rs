use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate item from the upstream list. Identity is `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub url: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: String,
}

impl Entry {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            published_at: None,
            summary: String::new(),
        }
    }
}
