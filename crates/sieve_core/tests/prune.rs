use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use sieve_core::{prune, update, ConfirmSettings, Effect, Entry, Msg, StateStore, Verdict};

fn start_run(store: StateStore, settings: &ConfirmSettings) -> StateStore {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    update(store, settings, Msg::RunStarted { at }).0
}

fn see(store: StateStore, settings: &ConfirmSettings, url: &str) -> StateStore {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    update(
        store,
        settings,
        Msg::EntryClassified {
            entry: Entry::new(url, "t"),
            verdict: Verdict::free("free_open_words=900"),
            at,
        },
    )
    .0
}

#[test]
fn record_survives_exactly_the_retention_window() {
    let settings = ConfirmSettings {
        retention_runs: 3,
        ..ConfirmSettings::default()
    };
    let url = "https://a.example/old";

    // Seen at run 2 (k = 2).
    let mut store = start_run(StateStore::new(), &settings);
    store = start_run(store, &settings);
    store = see(store, &settings, url);
    let (mut store, _) = update(store, &settings, Msg::RunFinished);

    // Runs 3..=5 keep it; run 5 == k + retention.
    for _ in 3..=5 {
        store = start_run(store, &settings);
        let (next, effects) = update(store, &settings, Msg::RunFinished);
        store = next;
        assert!(effects.is_empty());
        assert!(store.record(url).is_some());
    }

    // Run 6 == k + retention + 1 drops it.
    store = start_run(store, &settings);
    let (store, effects) = update(store, &settings, Msg::RunFinished);
    assert_eq!(
        effects,
        vec![Effect::Pruned {
            urls: vec![url.to_string()]
        }]
    );
    assert!(store.record(url).is_none());
    assert_eq!(store.run_seq(), 6);
}

#[test]
fn prune_leaves_current_records_and_counter() {
    let settings = ConfirmSettings::default();
    let mut store = start_run(StateStore::new(), &settings);
    store = see(store, &settings, "https://a.example/1");
    store = see(store, &settings, "https://a.example/2");
    let before = store.clone();

    let removed = prune(&mut store, 1, 0);
    assert!(removed.is_empty());
    assert_eq!(store, before);
}

#[test]
fn early_runs_never_underflow_cutoff() {
    let settings = ConfirmSettings::default();
    let mut store = start_run(StateStore::new(), &settings);
    store = see(store, &settings, "https://a.example/1");
    assert!(prune(&mut store, 1, 168).is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn prune_reports_removed_urls_in_key_order() {
    let settings = ConfirmSettings::default();
    let mut store = start_run(StateStore::new(), &settings);
    store = see(store, &settings, "https://b.example/");
    store = see(store, &settings, "https://a.example/");
    for _ in 0..3 {
        store = start_run(store, &settings);
    }
    store = see(store, &settings, "https://c.example/");

    let run_seq = store.run_seq();
    let removed = prune(&mut store, run_seq, 1);
    assert_eq!(
        removed,
        vec!["https://a.example/".to_string(), "https://b.example/".to_string()]
    );
    assert_eq!(store.len(), 1);
}
