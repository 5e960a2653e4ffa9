use crate::StateStore;

/// Drops every record whose `last_seen_seq < run_seq - retention_runs`.
///
/// Returns the removed URLs in key order. The run counter is left untouched.
pub fn prune(store: &mut StateStore, run_seq: u64, retention_runs: u64) -> Vec<String> {
    let Some(cutoff) = run_seq.checked_sub(retention_runs) else {
        return Vec::new();
    };

    let mut removed = Vec::new();
    store.retain(|url, record| {
        let keep = record.last_seen_seq >= cutoff;
        if !keep {
            removed.push(url.to_string());
        }
        keep
    });
    removed
}
