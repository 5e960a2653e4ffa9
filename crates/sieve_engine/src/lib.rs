//! Sieve engine: page fetching, gate classification, feed sources, state
//! persistence and the per-run pipeline.
mod classify;
mod decode;
mod feed;
mod fetch;
mod listing;
mod page;
mod persist;
mod pipeline;
mod report;
mod rss;
mod signals;
mod static_page;
mod store;
mod types;
mod visibility;

pub use classify::{fail_closed, ClassifierSettings, GateClassifier};
pub use decode::{decode_body, DecodedText};
pub use feed::{parse_feed, prepare_entries, FeedBatch, FeedSource, RssFeedSource};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use listing::{parse_listing, FallbackSource, HtmlListingSource};
pub use page::{PageLoader, PageView};
pub use persist::{ensure_parent_dir, write_atomic, PersistError};
pub use pipeline::{run_once, PipelineSettings, RunContext, RunReport, UrlOutcome};
pub use report::render_debug_report;
pub use rss::{build_rss, ChannelInfo};
pub use signals::{BodyLengthProbe, CheckBudget, EmailGateSignal, GateSignal, VisiblePhraseSignal};
pub use static_page::{HttpPageLoader, PageSettings, StaticPage};
pub use store::{encode_store, load_store, save_store, LoadStatus, StateSession};
pub use types::{CheckStage, FailureKind, FetchError, FetchMetadata, FetchOutput, PageError, SourceError};
