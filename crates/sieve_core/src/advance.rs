use chrono::{DateTime, Utc};

use crate::{ConfirmSettings, RunRecord, Status, Verdict};

/// Where and when a URL was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting<'a> {
    pub run_seq: u64,
    pub title: &'a str,
    pub seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub record: RunRecord,
    pub publish: bool,
}

/// Folds one verdict into a URL's record.
///
/// A FREE verdict extends the streak only when the prior record was FREE and was
/// seen in the immediately preceding run; any gap or GATED verdict restarts it.
/// Publication needs `confirm_free_runs` consecutive FREE runs.
pub fn advance(
    prior: Option<&RunRecord>,
    verdict: &Verdict,
    sighting: Sighting<'_>,
    settings: &ConfirmSettings,
) -> Advance {
    let free_streak = match verdict.status {
        Status::Gated => 0,
        Status::Free => match prior {
            Some(prev) if extends_streak(prev, sighting.run_seq) => {
                prev.free_streak.saturating_add(1)
            }
            _ => 1,
        },
    };

    let record = RunRecord {
        title: sighting.title.to_string(),
        last_status: verdict.status,
        last_reason: verdict.reason.clone(),
        free_streak,
        last_seen_seq: sighting.run_seq,
        last_seen_at: sighting.seen_at,
    };
    let publish =
        record.last_status == Status::Free && record.free_streak >= settings.confirm_free_runs;

    Advance { record, publish }
}

fn extends_streak(prev: &RunRecord, run_seq: u64) -> bool {
    prev.last_status == Status::Free && prev.last_seen_seq.checked_add(1) == Some(run_seq)
}
