use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Status;

/// Stored outcome of the most recent evaluation of one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub title: String,
    pub last_status: Status,
    pub last_reason: String,
    /// Consecutive FREE runs with no gap in run sequence.
    pub free_streak: u32,
    pub last_seen_seq: u64,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_seq: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Everything that survives between runs: the run counter and one record per URL.
///
/// The whole store is the unit of durability; it is loaded and saved in full.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateStore {
    meta: RunMeta,
    records: BTreeMap<String, RunRecord>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meta(&self) -> &RunMeta {
        &self.meta
    }

    pub fn run_seq(&self) -> u64 {
        self.meta.run_seq
    }

    pub fn record(&self, url: &str) -> Option<&RunRecord> {
        self.records.get(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Starts a new run: the sequence moves forward by exactly one.
    pub fn begin_run(&mut self, at: DateTime<Utc>) -> u64 {
        self.meta.run_seq += 1;
        self.meta.last_run_at = Some(at);
        self.meta.run_seq
    }

    pub(crate) fn put(&mut self, url: String, record: RunRecord) {
        self.records.insert(url, record);
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str, &RunRecord) -> bool) {
        self.records.retain(|url, record| keep(url, record));
    }
}
