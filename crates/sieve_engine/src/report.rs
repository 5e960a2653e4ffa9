use std::fmt::Write;

use sieve_core::Status;

use crate::RunReport;

const MAX_FREE_LINES: usize = 10;
const MAX_GATED_LINES: usize = 25;

/// Plain `key=value` diagnostics for one run.
pub fn render_debug_report(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "run_utc={}", report.run_at.to_rfc3339());
    let _ = writeln!(out, "run_seq={}", report.run_seq);

    match (&report.source, &report.source_error) {
        (_, Some(err)) => {
            let _ = writeln!(out, "ERROR_fetch_source");
            let _ = writeln!(out, "source_error={err}");
        }
        (Some(source), None) => {
            let _ = writeln!(out, "source_mode={source}");
            let _ = writeln!(out, "source_entries_count={}", report.entries_count);
        }
        (None, None) => {}
    }

    for outcome in report
        .outcomes
        .iter()
        .filter(|o| o.status == Status::Free)
        .take(MAX_FREE_LINES)
    {
        let _ = writeln!(
            out,
            "free_url={} streak={} reason={}",
            outcome.url, outcome.streak, outcome.reason
        );
    }
    for outcome in report
        .outcomes
        .iter()
        .filter(|o| o.status == Status::Gated)
        .take(MAX_GATED_LINES)
    {
        let _ = writeln!(out, "dropped_gated_url={} reason={}", outcome.url, outcome.reason);
    }

    let _ = writeln!(out, "checked_urls={}", report.checked);
    let _ = writeln!(out, "free_now={}", report.free_now);
    let _ = writeln!(out, "gated_now={}", report.gated_now);
    let _ = writeln!(out, "published_items={}", report.published.len());
    let _ = writeln!(out, "pruned_records={}", report.pruned.len());
    let _ = writeln!(out, "errors={}", report.errors);
    out
}
