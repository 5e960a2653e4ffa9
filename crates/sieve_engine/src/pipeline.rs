use std::time::Duration;

use chrono::{DateTime, Utc};
use engine_logging::{engine_error, engine_info};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use sieve_core::{update, ConfirmSettings, Effect, Entry, Msg, StateStore, Status, Verdict};

use crate::{fail_closed, prepare_entries, FeedSource, GateClassifier, PageLoader};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Upper bound on concurrent page checks.
    pub workers: usize,
    /// Pause after each page check.
    pub check_delay: Duration,
    pub max_entries: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            check_delay: Duration::from_millis(800),
            max_entries: 40,
        }
    }
}

/// Collaborators and knobs for one run.
pub struct RunContext<'a> {
    pub source: &'a dyn FeedSource,
    pub loader: &'a dyn PageLoader,
    pub classifier: &'a GateClassifier,
    pub confirm: ConfirmSettings,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlOutcome {
    pub url: String,
    pub status: Status,
    pub streak: u32,
    pub reason: String,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_seq: u64,
    pub run_at: DateTime<Utc>,
    pub source: Option<String>,
    pub source_error: Option<String>,
    pub entries_count: usize,
    pub checked: usize,
    pub free_now: usize,
    pub gated_now: usize,
    /// Page checks that failed and were dropped as gated.
    pub errors: usize,
    pub published: Vec<Entry>,
    pub outcomes: Vec<UrlOutcome>,
    pub pruned: Vec<String>,
}

impl RunReport {
    fn new(run_seq: u64, run_at: DateTime<Utc>) -> Self {
        Self {
            run_seq,
            run_at,
            source: None,
            source_error: None,
            entries_count: 0,
            checked: 0,
            free_now: 0,
            gated_now: 0,
            errors: 0,
            published: Vec::new(),
            outcomes: Vec::new(),
            pruned: Vec::new(),
        }
    }
}

/// One evaluation cycle: start run, fetch entries, classify, advance, prune.
///
/// The caller persists the returned store. When the entry list cannot be
/// obtained the store only carries the bumped run counter.
pub async fn run_once(
    store: StateStore,
    ctx: &RunContext<'_>,
    now: DateTime<Utc>,
) -> (StateStore, RunReport) {
    let (mut store, _) = update(store, &ctx.confirm, Msg::RunStarted { at: now });
    let run_seq = store.run_seq();
    engine_logging::set_run_seq(run_seq);
    let mut report = RunReport::new(run_seq, now);

    let batch = match ctx.source.fetch_entries().await {
        Ok(batch) => batch,
        Err(err) => {
            engine_error!("could not obtain entries: {}", err);
            report.source_error = Some(err.to_string());
            return (store, report);
        }
    };
    report.source = Some(batch.source.to_string());
    report.entries_count = batch.entries.len();
    let entries = prepare_entries(batch.entries, ctx.pipeline.max_entries);
    engine_info!(
        "checking {} of {} entries from {}",
        entries.len(),
        report.entries_count,
        batch.source
    );

    let checked: Vec<(Entry, Verdict, bool)> = stream::iter(entries)
        .map(|entry| check_entry(ctx, entry))
        .buffered(ctx.pipeline.workers.max(1))
        .collect()
        .await;

    for (entry, verdict, failed) in checked {
        report.checked += 1;
        if failed {
            report.errors += 1;
        }
        match verdict.status {
            Status::Free => report.free_now += 1,
            Status::Gated => report.gated_now += 1,
        }

        let (next, effects) = update(
            store,
            &ctx.confirm,
            Msg::EntryClassified {
                entry,
                verdict,
                at: now,
            },
        );
        store = next;
        for effect in effects {
            record_effect(&mut report, &store, effect);
        }
    }

    let (store, effects) = update(store, &ctx.confirm, Msg::RunFinished);
    for effect in effects {
        record_effect(&mut report, &store, effect);
    }

    engine_info!(
        "checked={} free_now={} gated_now={} published={} pruned={} errors={}",
        report.checked,
        report.free_now,
        report.gated_now,
        report.published.len(),
        report.pruned.len(),
        report.errors
    );
    (store, report)
}

async fn check_entry(ctx: &RunContext<'_>, entry: Entry) -> (Entry, Verdict, bool) {
    let (verdict, failed) = match ctx.classifier.check(ctx.loader, &entry.url).await {
        Ok(verdict) => (verdict, false),
        Err(err) => (fail_closed(&entry.url, &err), true),
    };
    if !ctx.pipeline.check_delay.is_zero() {
        tokio::time::sleep(ctx.pipeline.check_delay).await;
    }
    (entry, verdict, failed)
}

fn record_effect(report: &mut RunReport, store: &StateStore, effect: Effect) {
    match effect {
        Effect::Publish { entry, streak } => {
            let reason = store
                .record(&entry.url)
                .map(|record| record.last_reason.clone())
                .unwrap_or_default();
            report.outcomes.push(UrlOutcome {
                url: entry.url.clone(),
                status: Status::Free,
                streak,
                reason,
                published: true,
            });
            report.published.push(entry);
        }
        Effect::Withhold {
            url,
            status,
            streak,
            reason,
        } => report.outcomes.push(UrlOutcome {
            url,
            status,
            streak,
            reason,
            published: false,
        }),
        Effect::Pruned { urls } => {
            engine_info!("pruned {} stale records", urls.len());
            report.pruned = urls;
        }
        Effect::RunBegan { .. } => {}
    }
}
