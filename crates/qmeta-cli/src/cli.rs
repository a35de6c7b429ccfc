//! Command line arguments of `qmeta`.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use qmeta_cli::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "qmeta",
    version,
    about = "Reconcile questionnaire metadata and score responses",
    long_about = "Merge the column registries of the capture systems into one canonical mapping,\n\
                  build a typed question catalog and score response tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile the column registries and summarize the mapping.
    Map(MapArgs),

    /// Build the question catalog.
    Catalog(CatalogArgs),

    /// Build and validate the score registry.
    Rules(RulesArgs),

    /// Score a response table.
    Score(ScoreArgs),
}

#[derive(Args)]
pub struct ProjectArgs {
    /// Project manifest naming every input table.
    #[arg(long = "manifest", value_name = "PATH", default_value = "qmeta.toml")]
    pub manifest: PathBuf,
}

#[derive(Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Write the mapping rows to this CSV file.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// List the questions of one questionnaire instead of the overview.
    #[arg(long = "questionnaire", value_name = "NAME")]
    pub questionnaire: Option<String>,
}

#[derive(Args)]
pub struct RulesArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Response table to score.
    #[arg(long = "responses", value_name = "CSV")]
    pub responses: PathBuf,

    /// Score only this questionnaire.
    #[arg(long = "questionnaire", value_name = "NAME")]
    pub questionnaire: Option<String>,

    /// Write the scored table to this CSV file.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// `--log-level` wins over `-v/-q`; either one disables `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.verbosity.is_present() || self.log_level.is_some();
        let level_filter = self
            .log_level
            .map_or_else(|| self.verbosity.tracing_level_filter(), LevelFilter::from);
        let to_file = self.log_file.is_some();
        LogConfig {
            level_filter,
            use_env_filter: !explicit,
            // File logs outlive the run, so they get timestamps.
            with_timestamps: to_file,
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            with_ansi: match self.color.color {
                ColorChoice::Always => true,
                ColorChoice::Never => false,
                ColorChoice::Auto => !to_file && io::stderr().is_terminal(),
            },
            ..LogConfig::default()
        }
    }
}
