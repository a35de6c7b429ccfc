//! Logging setup for the `qmeta` binary.
//!
//! Library crates only emit `tracing` events; this module owns the subscriber.
//!
//! # Log Levels
//!
//! - `error`: fatal configuration or input errors
//! - `warn`: mapping, catalog and scoring findings for operator review
//! - `info`: stage progress and counts
//! - `debug`: per-questionnaire detail

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Crates whose events pass the default filter at the configured level.
const QMETA_CRATES: &[&str] = &[
    "qmeta",
    "qmeta_cli",
    "qmeta_common",
    "qmeta_model",
    "qmeta_ingest",
    "qmeta_map",
    "qmeta_catalog",
    "qmeta_score",
];

type FormatLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter` when it is set.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    /// Include the module path of each event.
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

/// Install the global subscriber. Call once at startup.
///
/// # Errors
///
/// Fails when the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            init_logging_with_writer(config, Mutex::new(file))
        }
        None => init_logging_with_writer(config, io::stderr),
    }
}

/// Install the global subscriber writing to `writer`.
///
/// # Errors
///
/// Fails when a global subscriber is already set.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W) -> io::Result<()>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(format_layer(config, writer))
        .with(build_env_filter(config.level_filter, config.use_env_filter))
        .try_init()
        .map_err(io::Error::other)
}

fn format_layer<W>(config: &LogConfig, writer: W) -> FormatLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(config.with_target);
    // JSON output is never coloured.
    match (config.format, config.with_timestamps) {
        (LogFormat::Json, _) => base.json().boxed(),
        (LogFormat::Compact, true) => base.compact().with_ansi(config.with_ansi).boxed(),
        (LogFormat::Compact, false) => base
            .compact()
            .with_ansi(config.with_ansi)
            .without_time()
            .boxed(),
        (LogFormat::Pretty, true) => base.with_ansi(config.with_ansi).boxed(),
        (LogFormat::Pretty, false) => base.with_ansi(config.with_ansi).without_time().boxed(),
    }
}

/// Default directives: qmeta crates at `level_filter`, everything else at warn.
pub fn default_directives(level_filter: LevelFilter) -> String {
    let level = level_filter.to_string().to_lowercase();
    std::iter::once("warn".to_string())
        .chain(QMETA_CRATES.iter().map(|name| format!("{name}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_env_filter(level_filter: LevelFilter, use_env_filter: bool) -> EnvFilter {
    let defaults = || EnvFilter::new(default_directives(level_filter));
    if !use_env_filter {
        return defaults();
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| defaults())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_name_every_crate() {
        insta::assert_snapshot!(
            default_directives(LevelFilter::DEBUG),
            @"warn,qmeta=debug,qmeta_cli=debug,qmeta_common=debug,qmeta_model=debug,qmeta_ingest=debug,qmeta_map=debug,qmeta_catalog=debug,qmeta_score=debug"
        );
    }

    #[test]
    fn off_keeps_external_crates_at_warn() {
        assert!(default_directives(LevelFilter::OFF).starts_with("warn,qmeta=off"));
    }

    #[test]
    fn defaults_log_warnings_to_stderr() {
        let config = LogConfig::default();
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert!(config.use_env_filter);
        assert!(config.log_file.is_none());
    }
}
