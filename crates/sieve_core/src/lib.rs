//! Sieve core: verdict types, per-URL confirmation state machine and pruning.
//!
//! Nothing in this crate performs IO. The engine feeds it classifier verdicts
//! and persists the resulting [`StateStore`].
mod advance;
mod effect;
mod entry;
mod msg;
mod prune;
mod settings;
mod state;
mod status;
mod update;

pub use advance::{advance, Advance, Sighting};
pub use effect::Effect;
pub use entry::Entry;
pub use msg::Msg;
pub use prune::prune;
pub use settings::{ConfirmSettings, DEFAULT_CONFIRM_FREE_RUNS, DEFAULT_RETENTION_RUNS};
pub use state::{RunMeta, RunRecord, StateStore};
pub use status::{Status, Verdict};
pub use update::update;
