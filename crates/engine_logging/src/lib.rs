#![deny(missing_docs)]
//! Shared logging utilities for the sieve workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a process-wide run marker that is stamped onto every message, and a
//! minimal test initializer for the global logger.

use std::sync::atomic::{AtomicU64, Ordering};

/// Run sequence of the evaluation currently in progress. Zero means "not started".
static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Records the run sequence number so later log lines can be attributed to it.
///
/// Classification tasks may hop between runtime worker threads, so this is a
/// process-wide value rather than a thread-local one.
pub fn set_run_seq(run_seq: u64) {
    RUN_SEQ.store(run_seq, Ordering::Relaxed);
}

/// Returns the run sequence number set by [`set_run_seq`], or 0 if unset.
pub fn run_seq() -> u64 {
    RUN_SEQ.load(Ordering::Relaxed)
}

/// Formats the `[run N] ` prefix, or nothing before the run has begun.
#[doc(hidden)]
pub fn run_prefix() -> String {
    match run_seq() {
        0 => String::new(),
        seq => format!("[run {seq}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
