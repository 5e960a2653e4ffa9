/// Consecutive FREE runs required before an item is published.
pub const DEFAULT_CONFIRM_FREE_RUNS: u32 = 2;
/// Runs a URL may stay unseen before its record is dropped (7 days hourly).
pub const DEFAULT_RETENTION_RUNS: u64 = 168;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmSettings {
    pub confirm_free_runs: u32,
    pub retention_runs: u64,
}

impl Default for ConfirmSettings {
    fn default() -> Self {
        Self {
            confirm_free_runs: DEFAULT_CONFIRM_FREE_RUNS,
            retention_runs: DEFAULT_RETENTION_RUNS,
        }
    }
}
