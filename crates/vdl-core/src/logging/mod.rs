//! Logging init: the process-wide logger and per-job engine loggers.
//!
//! The process logger always writes to stderr and, when `MasterLog` is set in
//! the `DEFAULT` section, to a file as well. Job loggers are built per job by
//! [`build_job_logger`] and never installed globally.

mod job;
mod template;
mod writer;

pub use job::{build_job_logger, JobLogSettings, JobLogger, DEBUG_PREFIX};
pub use template::{level_name, level_number, LogTemplate};

use anyhow::{Context, Result};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::debug_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LogMode, Section};
use crate::PROG;
use template::write_bare;
use writer::LogFile;

pub const CONSOLE_FMT: &str = "%(module)s: %(levelname)s: %(message)s";
pub const MASTER_FILE_FMT: &str = "%(asctime)s *** %(levelname)s %(message)s";
pub const MASTER_DATEFMT: &str = "%Y-%m-%dT%H:%M:%S%z";
pub const JOB_FILE_FMT: &str = "%(asctime)s %(levelno)s %(message)s";
pub const DEFAULT_DATEFMT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Numeric level of a level name (`DEBUG`, `WARNING`, ...) or decimal
/// integer. Anything else is DEBUG (10).
pub fn parse_log_level(text: &str) -> i32 {
    match text.trim().to_uppercase().as_str() {
        "CRITICAL" | "FATAL" => 50,
        "ERROR" => 40,
        "WARNING" | "WARN" => 30,
        "INFO" => 20,
        "DEBUG" => 10,
        "NOTSET" => 0,
        other => other.parse().unwrap_or(10),
    }
}

/// Filter letting through records at or above numeric `level`.
pub fn level_filter(level: i32) -> LevelFilter {
    match level {
        i32::MIN..=5 => LevelFilter::TRACE,
        6..=10 => LevelFilter::DEBUG,
        11..=20 => LevelFilter::INFO,
        21..=30 => LevelFilter::WARN,
        31..=40 => LevelFilter::ERROR,
        _ => LevelFilter::OFF,
    }
}

/// `MasterLog*` settings from the `DEFAULT` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterLogOptions {
    pub file: Option<PathBuf>,
    pub level: i32,
    pub fmt: String,
    pub datefmt: String,
}

impl Default for MasterLogOptions {
    fn default() -> Self {
        Self {
            file: None,
            level: 10,
            fmt: MASTER_FILE_FMT.to_string(),
            datefmt: MASTER_DATEFMT.to_string(),
        }
    }
}

impl MasterLogOptions {
    pub fn from_section(defaults: &Section<'_>) -> Self {
        Self {
            file: defaults
                .get("MasterLog")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            level: parse_log_level(defaults.get("MasterLogLevel").unwrap_or_default()),
            fmt: defaults.get("MasterLogFmt").unwrap_or(MASTER_FILE_FMT).to_string(),
            datefmt: defaults
                .get("MasterLogDateFmt")
                .unwrap_or(MASTER_DATEFMT)
                .to_string(),
        }
    }
}

fn console_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()))
}

/// Install the process logger: stderr at `console_level` (or `RUST_LOG`),
/// plus the master log file if configured.
pub fn init_logging(console_level: LevelFilter, master: &MasterLogOptions) -> Result<()> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .fmt_fields(debug_fn(write_bare))
        .event_format(LogTemplate::new(PROG, CONSOLE_FMT, DEFAULT_DATEFMT))
        .with_filter(console_filter(console_level));

    let file = match &master.file {
        Some(path) => {
            let writer = LogFile::open(path, LogMode::Append)
                .with_context(|| format!("open master log {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .fmt_fields(debug_fn(write_bare))
                    .event_format(LogTemplate::new(PROG, &master.fmt, &master.datefmt))
                    .with_filter(level_filter(master.level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("install process logger")?;
    Ok(())
}

/// Initialize logging to stderr only (no file). Use when `init_logging()`
/// fails or before configuration is available, so the CLI doesn't crash.
pub fn init_logging_stderr(console_level: LevelFilter) {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .fmt_fields(debug_fn(write_bare))
        .event_format(LogTemplate::new(PROG, CONSOLE_FMT, DEFAULT_DATEFMT))
        .with_filter(console_filter(console_level));
    let _ = tracing_subscriber::registry().with(console).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn log_level_names_and_numbers() {
        assert_eq!(parse_log_level("DEBUG"), 10);
        assert_eq!(parse_log_level("critical"), 50);
        assert_eq!(parse_log_level("Warning"), 30);
        assert_eq!(parse_log_level("BASIC_FORMAT"), 10);
        assert_eq!(parse_log_level("<any>"), 10);
        assert_eq!(parse_log_level(""), 10);
        assert_eq!(parse_log_level("-1"), -1);
        assert_eq!(parse_log_level("25"), 25);
    }

    #[test]
    fn numeric_levels_to_filters() {
        assert_eq!(level_filter(-1), LevelFilter::TRACE);
        assert_eq!(level_filter(10), LevelFilter::DEBUG);
        assert_eq!(level_filter(15), LevelFilter::INFO);
        assert_eq!(level_filter(20), LevelFilter::INFO);
        assert_eq!(level_filter(30), LevelFilter::WARN);
        assert_eq!(level_filter(40), LevelFilter::ERROR);
        assert_eq!(level_filter(50), LevelFilter::OFF);
    }

    #[test]
    fn master_options_from_defaults() {
        let cfg = Config::parse_str(
            "t",
            "[DEFAULT]\nMasterLog = /var/log/vdl.log\nMasterLogLevel = info\n[job]\n",
        )
        .unwrap();
        let opts = MasterLogOptions::from_section(&cfg.defaults());
        assert_eq!(opts.file, Some(PathBuf::from("/var/log/vdl.log")));
        assert_eq!(opts.level, 20);
        assert_eq!(opts.fmt, MASTER_FILE_FMT);
        assert_eq!(opts.datefmt, MASTER_DATEFMT);

        let empty = Config::parse_str("t", "[job]\n").unwrap();
        assert_eq!(MasterLogOptions::from_section(&empty.defaults()), MasterLogOptions::default());
    }
}
