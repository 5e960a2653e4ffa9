use crate::advance::{advance, Sighting};
use crate::{prune, ConfirmSettings, Effect, Msg, StateStore};

/// Pure update function: applies a message to the store and returns any effects.
pub fn update(
    mut store: StateStore,
    settings: &ConfirmSettings,
    msg: Msg,
) -> (StateStore, Vec<Effect>) {
    let effects = match msg {
        Msg::RunStarted { at } => {
            let run_seq = store.begin_run(at);
            vec![Effect::RunBegan { run_seq }]
        }
        Msg::EntryClassified { entry, verdict, at } => {
            let run_seq = store.run_seq();
            // Verdicts only make sense inside a run.
            if run_seq == 0 {
                return (store, Vec::new());
            }
            let next = advance(
                store.record(&entry.url),
                &verdict,
                Sighting {
                    run_seq,
                    title: &entry.title,
                    seen_at: at,
                },
                settings,
            );
            let streak = next.record.free_streak;
            let status = next.record.last_status;
            store.put(entry.url.clone(), next.record);

            if next.publish {
                vec![Effect::Publish { entry, streak }]
            } else {
                vec![Effect::Withhold {
                    url: entry.url,
                    status,
                    streak,
                    reason: verdict.reason,
                }]
            }
        }
        Msg::RunFinished => {
            let run_seq = store.run_seq();
            let urls = prune(&mut store, run_seq, settings.retention_runs);
            if urls.is_empty() {
                Vec::new()
            } else {
                vec![Effect::Pruned { urls }]
            }
        }
    };

    (store, effects)
}
