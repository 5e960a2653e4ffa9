use chrono::{DateTime, Utc};

use crate::{Entry, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A new scheduled run begins; bumps the run sequence.
    RunStarted { at: DateTime<Utc> },
    /// The classifier produced a verdict for an entry of the current run.
    EntryClassified {
        entry: Entry,
        verdict: Verdict,
        at: DateTime<Utc>,
    },
    /// All entries were evaluated; stale records may be pruned.
    RunFinished,
}
