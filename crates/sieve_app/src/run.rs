//! Wiring for one run: state session, engine collaborators, outputs.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use sieve_engine::{
    build_rss, render_debug_report, run_once, write_atomic, FallbackSource, FeedSource, Fetcher,
    GateClassifier, HtmlListingSource, HttpPageLoader, LoadStatus, ReqwestFetcher, RssFeedSource,
    RunContext, RunReport, StateSession,
};

use crate::config::SieveConfig;

pub fn build_source(config: &SieveConfig) -> FallbackSource {
    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.feed_fetch_settings()));
    let primary: Box<dyn FeedSource> =
        Box::new(RssFeedSource::new(fetcher.clone(), config.feed_url.clone()));
    let fallback = config.listing_url.as_ref().map(|url| {
        Box::new(HtmlListingSource::new(
            fetcher.clone(),
            url.clone(),
            config.listing_link_selector.clone(),
        )) as Box<dyn FeedSource>
    });
    FallbackSource::new(primary, fallback)
}

/// Runs one evaluation cycle and writes every output. Returns the run report.
pub async fn execute(config: &SieveConfig) -> Result<RunReport> {
    let mut session = StateSession::open(&config.state_file)
        .with_context(|| format!("opening state {}", config.state_file.display()))?;
    match session.status() {
        LoadStatus::Fresh => engine_info!("no state at {:?}; first run", session.path()),
        LoadStatus::Loaded => {}
        LoadStatus::Recovered { reason } => {
            engine_warn!("state at {:?} was unusable ({}); starting over", session.path(), reason)
        }
    }

    let source = build_source(config);
    let page_fetcher: Arc<dyn Fetcher> =
        Arc::new(ReqwestFetcher::new(config.page_fetch_settings()));
    let loader = HttpPageLoader::new(page_fetcher, config.page_settings());
    let classifier = GateClassifier::new(config.classifier_settings());
    let ctx = RunContext {
        source: &source,
        loader: &loader,
        classifier: &classifier,
        confirm: config.confirm_settings(),
        pipeline: config.pipeline_settings(),
    };

    let now = Utc::now();
    let (store, report) = run_once(session.take_store(), &ctx, now).await;

    let rss = build_rss(&config.channel_info(), &report.published, now)
        .context("rendering RSS document")?;
    write_atomic(&config.output_file, &rss)
        .with_context(|| format!("writing {}", config.output_file.display()))?;
    write_atomic(&config.debug_file, &render_debug_report(&report))
        .with_context(|| format!("writing {}", config.debug_file.display()))?;
    session
        .commit(store)
        .with_context(|| format!("saving state {}", config.state_file.display()))?;

    engine_info!(
        "wrote {} items to {:?}",
        report.published.len(),
        config.output_file
    );
    Ok(report)
}
