use std::sync::Once;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use sieve_core::{update, ConfirmSettings, Effect, Entry, Msg, StateStore, Status, Verdict};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn run_time(run_seq: u64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(run_seq as i64)
}

/// Drives one full run and returns the URLs published in it.
fn run(
    store: StateStore,
    settings: &ConfirmSettings,
    verdicts: &[(&str, Verdict)],
) -> (StateStore, Vec<String>) {
    let at = run_time(store.run_seq() + 1);
    let (mut store, _) = update(store, settings, Msg::RunStarted { at });
    let mut published = Vec::new();
    for (url, verdict) in verdicts {
        let (next, effects) = update(
            store,
            settings,
            Msg::EntryClassified {
                entry: Entry::new(*url, format!("Title of {url}")),
                verdict: verdict.clone(),
                at,
            },
        );
        store = next;
        for effect in effects {
            if let Effect::Publish { entry, .. } = effect {
                published.push(entry.url);
            }
        }
    }
    let (store, _) = update(store, settings, Msg::RunFinished);
    (store, published)
}

fn free() -> Verdict {
    Verdict::free("free_open_words=1200")
}

fn gated() -> Verdict {
    Verdict::gated("visible_phrase:Enter your email")
}

fn streak(store: &StateStore, url: &str) -> u32 {
    store.record(url).expect("record present").free_streak
}

#[test]
fn run_started_bumps_sequence_by_one() {
    init_logging();
    let settings = ConfirmSettings::default();
    let (store, effects) = update(
        StateStore::new(),
        &settings,
        Msg::RunStarted { at: run_time(1) },
    );
    assert_eq!(effects, vec![Effect::RunBegan { run_seq: 1 }]);
    assert_eq!(store.meta().last_run_at, Some(run_time(1)));

    let (store, effects) = update(store, &settings, Msg::RunStarted { at: run_time(2) });
    assert_eq!(effects, vec![Effect::RunBegan { run_seq: 2 }]);
    assert_eq!(store.run_seq(), 2);
}

#[test]
fn gated_verdict_always_resets_streak() {
    init_logging();
    let settings = ConfirmSettings::default();
    let mut store = StateStore::new();
    let sequence = [free(), free(), free(), gated(), free(), gated(), gated()];
    for verdict in sequence {
        let was_gated = verdict.status == Status::Gated;
        let (next, _) = run(store, &settings, &[("https://a.example/x", verdict)]);
        store = next;
        if was_gated {
            assert_eq!(streak(&store, "https://a.example/x"), 0);
        }
    }
}

#[test]
fn threshold_publishes_on_second_consecutive_free_run() {
    init_logging();
    let settings = ConfirmSettings::default();
    let url = "https://a.example/story";

    let (store, published) = run(StateStore::new(), &settings, &[(url, free())]);
    assert!(published.is_empty());
    assert_eq!(streak(&store, url), 1);

    let (store, published) = run(store, &settings, &[(url, free())]);
    assert_eq!(published, vec![url.to_string()]);
    assert_eq!(streak(&store, url), 2);

    let (store, published) = run(store, &settings, &[(url, gated())]);
    assert!(published.is_empty());
    assert_eq!(streak(&store, url), 0);
    assert_eq!(store.record(url).unwrap().last_status, Status::Gated);
}

#[test]
fn gap_in_run_sequence_breaks_streak() {
    init_logging();
    let settings = ConfirmSettings::default();
    let url = "https://c.example/gap";

    let (store, _) = run(StateStore::new(), &settings, &[(url, free())]);
    let (store, _) = run(store, &settings, &[]);
    let (store, published) = run(store, &settings, &[(url, free())]);

    assert_eq!(streak(&store, url), 1);
    assert!(published.is_empty());
    assert_eq!(store.record(url).unwrap().last_seen_seq, 3);
}

#[test]
fn two_entries_diverge_on_third_run() {
    init_logging();
    let settings = ConfirmSettings::default();
    let a = "https://news.example/a";
    let b = "https://news.example/b";

    let (store, published) = run(StateStore::new(), &settings, &[(a, free()), (b, free())]);
    assert!(published.is_empty());

    let (store, published) = run(store, &settings, &[(a, free()), (b, free())]);
    assert_eq!(published, vec![a.to_string(), b.to_string()]);

    let (store, published) = run(store, &settings, &[(a, gated()), (b, free())]);
    assert_eq!(published, vec![b.to_string()]);
    assert_eq!(streak(&store, a), 0);
    assert_eq!(streak(&store, b), 3);
}

#[test]
fn published_item_stays_published_while_streak_holds() {
    init_logging();
    let settings = ConfirmSettings {
        confirm_free_runs: 3,
        ..ConfirmSettings::default()
    };
    let url = "https://a.example/long";
    let mut store = StateStore::new();
    let mut history = Vec::new();
    for _ in 0..5 {
        let (next, published) = run(store, &settings, &[(url, free())]);
        store = next;
        history.push(!published.is_empty());
    }
    assert_eq!(history, vec![false, false, true, true, true]);
}

#[test]
fn every_verdict_refreshes_record_metadata() {
    init_logging();
    let settings = ConfirmSettings::default();
    let url = "https://a.example/meta";
    let (store, _) = run(StateStore::new(), &settings, &[(url, free())]);
    let (store, _) = run(store, &settings, &[(url, Verdict::gated("playwright_timeout_drop"))]);

    let record = store.record(url).unwrap();
    assert_eq!(record.last_status, Status::Gated);
    assert_eq!(record.last_reason, "playwright_timeout_drop");
    assert_eq!(record.last_seen_seq, 2);
    assert_eq!(record.last_seen_at, run_time(2));
    assert_eq!(record.title, format!("Title of {url}"));
}

#[test]
fn withheld_entries_report_status_and_reason() {
    init_logging();
    let settings = ConfirmSettings::default();
    let (store, _) = update(
        StateStore::new(),
        &settings,
        Msg::RunStarted { at: run_time(1) },
    );
    let (_, effects) = update(
        store,
        &settings,
        Msg::EntryClassified {
            entry: Entry::new("https://a.example/w", "W"),
            verdict: gated(),
            at: run_time(1),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Withhold {
            url: "https://a.example/w".to_string(),
            status: Status::Gated,
            streak: 0,
            reason: "visible_phrase:Enter your email".to_string(),
        }]
    );
}
