//! Run configuration: RON file, defaults and command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sieve_core::{ConfirmSettings, DEFAULT_CONFIRM_FREE_RUNS, DEFAULT_RETENTION_RUNS};
use sieve_engine::{
    ChannelInfo, ClassifierSettings, FetchSettings, PageSettings, PipelineSettings,
};
use thiserror::Error;

use crate::cli::Args;

pub const DEFAULT_FEED_URL: &str = "https://www.foreignaffairs.com/rss.xml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        let info = ChannelInfo::default();
        Self {
            title: info.title,
            link: info.link,
            description: info.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    pub feed_url: String,
    pub listing_url: Option<String>,
    pub listing_link_selector: String,
    pub max_entries: usize,

    pub confirm_free_runs: u32,
    pub retention_runs: u64,
    pub min_visible_words: usize,

    pub load_timeout_ms: u64,
    pub initial_settle_ms: u64,
    pub check_timeout_ms: u64,
    pub scroll_settle_ms: u64,
    pub check_delay_ms: u64,
    pub workers: usize,

    pub gate_phrases: Vec<String>,
    pub cta_phrases: Vec<String>,
    pub body_selectors: Vec<String>,
    pub max_counted_elements: usize,

    pub user_agent: String,
    pub accept_language: String,

    pub state_file: PathBuf,
    pub output_file: PathBuf,
    pub debug_file: PathBuf,
    pub channel: ChannelConfig,
}

impl Default for SieveConfig {
    fn default() -> Self {
        let classifier = ClassifierSettings::default();
        let pages = PageSettings::default();
        let fetch = FetchSettings::default();
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            listing_url: None,
            listing_link_selector: "article a[href], h3 a[href]".to_string(),
            max_entries: PipelineSettings::default().max_entries,
            confirm_free_runs: DEFAULT_CONFIRM_FREE_RUNS,
            retention_runs: DEFAULT_RETENTION_RUNS,
            min_visible_words: classifier.min_visible_words,
            load_timeout_ms: 35_000,
            initial_settle_ms: millis(pages.initial_settle),
            check_timeout_ms: millis(classifier.check_timeout),
            scroll_settle_ms: millis(pages.scroll_settle),
            check_delay_ms: millis(PipelineSettings::default().check_delay),
            workers: 1,
            gate_phrases: classifier.gate_phrases,
            cta_phrases: classifier.cta_phrases,
            body_selectors: classifier.body_selectors,
            max_counted_elements: pages.max_counted_elements,
            user_agent: fetch.user_agent,
            accept_language: fetch.accept_language,
            state_file: PathBuf::from("state.ron"),
            output_file: PathBuf::from("index.xml"),
            debug_file: PathBuf::from("debug.txt"),
            channel: ChannelConfig::default(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl SieveConfig {
    /// Reads `path` when given; otherwise every field is a default.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(text: &str) -> Result<Self, String> {
        ron::from_str(text).map_err(|err| err.to_string())
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(path) = &args.state {
            self.state_file = path.clone();
        }
        if let Some(path) = &args.output {
            self.output_file = path.clone();
        }
        if let Some(path) = &args.debug_file {
            self.debug_file = path.clone();
        }
        if let Some(url) = &args.feed_url {
            self.feed_url = url.clone();
        }
        if let Some(url) = &args.listing_url {
            self.listing_url = Some(url.clone());
        }
        if let Some(runs) = args.confirm_runs {
            self.confirm_free_runs = runs;
        }
        if let Some(words) = args.min_words {
            self.min_visible_words = words;
        }
        if let Some(workers) = args.workers {
            self.workers = usize::from(workers);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed_url is empty".into()));
        }
        if self.confirm_free_runs == 0 {
            return Err(ConfigError::Invalid(
                "confirm_free_runs must be at least 1".into(),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.max_entries == 0 {
            return Err(ConfigError::Invalid("max_entries must be at least 1".into()));
        }
        if self.body_selectors.is_empty() {
            return Err(ConfigError::Invalid("body_selectors is empty".into()));
        }
        Ok(())
    }

    /// Settings for article page requests.
    pub fn page_fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_millis(self.load_timeout_ms),
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
            ..FetchSettings::default()
        }
    }

    /// Settings for the feed and listing requests.
    pub fn feed_fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
            ..FetchSettings::for_feeds()
        }
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            initial_settle: Duration::from_millis(self.initial_settle_ms),
            scroll_settle: Duration::from_millis(self.scroll_settle_ms),
            max_counted_elements: self.max_counted_elements,
        }
    }

    pub fn classifier_settings(&self) -> ClassifierSettings {
        let check_timeout = Duration::from_millis(self.check_timeout_ms);
        ClassifierSettings {
            // The loader's settle wait happens inside the load.
            load_timeout: Duration::from_millis(
                self.load_timeout_ms.saturating_add(self.initial_settle_ms),
            ),
            check_timeout,
            scroll_timeout: Duration::from_millis(self.scroll_settle_ms) + check_timeout,
            gate_phrases: self.gate_phrases.clone(),
            cta_phrases: self.cta_phrases.clone(),
            body_selectors: self.body_selectors.clone(),
            min_visible_words: self.min_visible_words,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            workers: self.workers,
            check_delay: Duration::from_millis(self.check_delay_ms),
            max_entries: self.max_entries,
        }
    }

    pub fn confirm_settings(&self) -> ConfirmSettings {
        ConfirmSettings {
            confirm_free_runs: self.confirm_free_runs,
            retention_runs: self.retention_runs,
        }
    }

    pub fn channel_info(&self) -> ChannelInfo {
        ChannelInfo {
            title: self.channel.title.clone(),
            link: self.channel.link.clone(),
            description: self.channel.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_tuned_deployment() {
        let config = SieveConfig::default();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.max_entries, 40);
        assert_eq!(config.confirm_free_runs, 2);
        assert_eq!(config.min_visible_words, 700);
        assert_eq!(config.retention_runs, 168);
        assert_eq!(config.load_timeout_ms, 35_000);
        assert_eq!(config.initial_settle_ms, 2_000);
        assert_eq!(config.check_timeout_ms, 2_000);
        assert_eq!(config.scroll_settle_ms, 900);
        assert_eq!(config.check_delay_ms, 800);
        assert_eq!(config.workers, 1);
        assert_eq!(config.gate_phrases.len(), 7);
        assert_eq!(config.state_file, PathBuf::from("state.ron"));
        assert_eq!(config.output_file, PathBuf::from("index.xml"));
        assert_eq!(config.debug_file, PathBuf::from("debug.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = SieveConfig::parse(
            r#"(
                feed_url: "https://news.example/rss.xml",
                confirm_free_runs: 3,
                gate_phrases: ["Members only"],
                channel: (title: "Open reads"),
            )"#,
        )
        .unwrap();
        assert_eq!(config.feed_url, "https://news.example/rss.xml");
        assert_eq!(config.confirm_free_runs, 3);
        assert_eq!(config.gate_phrases, vec!["Members only".to_string()]);
        assert_eq!(config.channel.title, "Open reads");
        assert_eq!(config.channel.link, ChannelConfig::default().link);
        assert_eq!(config.min_visible_words, 700);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent.ron");
        assert!(matches!(
            SieveConfig::load(Some(missing.as_path())),
            Err(ConfigError::Read { .. })
        ));

        let broken = temp.path().join("broken.ron");
        fs::write(&broken, "(workers: \"many\")").unwrap();
        assert!(matches!(
            SieveConfig::load(Some(broken.as_path())),
            Err(ConfigError::Parse { .. })
        ));

        assert_eq!(SieveConfig::load(None).unwrap(), SieveConfig::default());
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config = SieveConfig::parse("(workers: 2, min_visible_words: 500)").unwrap();
        let args = Args::try_parse_from([
            "sieve",
            "--workers",
            "3",
            "--confirm-runs",
            "4",
            "--state",
            "/tmp/s.ron",
            "--listing-url",
            "https://news.example/latest",
        ])
        .unwrap();
        config.apply_args(&args);

        assert_eq!(config.workers, 3);
        assert_eq!(config.confirm_free_runs, 4);
        assert_eq!(config.min_visible_words, 500);
        assert_eq!(config.state_file, PathBuf::from("/tmp/s.ron"));
        assert_eq!(
            config.listing_url.as_deref(),
            Some("https://news.example/latest")
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = SieveConfig {
            workers: 0,
            ..SieveConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = SieveConfig {
            confirm_free_runs: 0,
            ..SieveConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn engine_settings_follow_config() {
        let config = SieveConfig {
            load_timeout_ms: 10_000,
            initial_settle_ms: 1_000,
            check_timeout_ms: 500,
            scroll_settle_ms: 300,
            ..SieveConfig::default()
        };
        let classifier = config.classifier_settings();
        assert_eq!(classifier.load_timeout, Duration::from_millis(11_000));
        assert_eq!(classifier.check_timeout, Duration::from_millis(500));
        assert_eq!(classifier.scroll_timeout, Duration::from_millis(800));
        assert_eq!(
            config.page_fetch_settings().request_timeout,
            Duration::from_secs(10)
        );
        assert_eq!(config.page_settings().scroll_settle, Duration::from_millis(300));
        assert_eq!(config.confirm_settings().confirm_free_runs, 2);
        assert_eq!(config.pipeline_settings().check_delay, Duration::from_millis(800));
    }
}
