use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Free,
    Gated,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Free => write!(f, "FREE"),
            Status::Gated => write!(f, "GATED"),
        }
    }
}

/// One classifier judgment for one URL in one run.
///
/// `reason` is a diagnostic code only; nothing branches on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub reason: String,
}

impl Verdict {
    pub fn free(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Free,
            reason: reason.into(),
        }
    }

    pub fn gated(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Gated,
            reason: reason.into(),
        }
    }
}
