use crate::{Entry, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunBegan {
        run_seq: u64,
    },
    /// The entry is confirmed free for this run and should be emitted.
    Publish {
        entry: Entry,
        streak: u32,
    },
    Withhold {
        url: String,
        status: Status,
        streak: u32,
        reason: String,
    },
    Pruned {
        urls: Vec<String>,
    },
}
