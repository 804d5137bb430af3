//! Per-job logger for engine output.
//!
//! Each job owns a [`JobLogger`] with its own subscriber: console output at
//! the CLI verbosity plus an optional log file. Nothing is registered
//! globally, so jobs cannot see each other's handlers.

use std::io;
use std::path::PathBuf;
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::format::debug_fn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use super::template::{write_bare, LogTemplate};
use super::writer::LogFile;
use super::{CONSOLE_FMT, DEFAULT_DATEFMT, JOB_FILE_FMT};
use crate::config::{LogMode, Section};

/// Engine messages carrying this prefix are real debug output; with
/// `DistinguishDebug` everything else sent at debug level is shown as info.
pub const DEBUG_PREFIX: &str = "[debug] ";

#[derive(Debug, Clone, PartialEq)]
pub struct JobLogSettings {
    pub console_level: LevelFilter,
    pub file: Option<PathBuf>,
    pub mode: LogMode,
    pub fmt: String,
    pub datefmt: String,
    pub distinguish_debug: bool,
}

impl JobLogSettings {
    /// Read `Log`, `LogMode`, `LogFmt`, `LogDateFmt` and `DistinguishDebug`.
    pub fn from_section(section: &Section<'_>, console_level: LevelFilter) -> Self {
        Self {
            console_level,
            file: section.get("Log").filter(|p| !p.is_empty()).map(PathBuf::from),
            mode: section.parse_log_mode("LogMode"),
            fmt: section.get("LogFmt").unwrap_or(JOB_FILE_FMT).to_string(),
            datefmt: section.get("LogDateFmt").unwrap_or(DEFAULT_DATEFMT).to_string(),
            distinguish_debug: section.get_boolean("DistinguishDebug", false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobLogger {
    name: String,
    dispatch: Dispatch,
    distinguish_debug: bool,
}

impl JobLogger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, level: Level, message: &str) {
        let level = if level == Level::DEBUG
            && self.distinguish_debug
            && !message.starts_with(DEBUG_PREFIX)
        {
            Level::INFO
        } else {
            level
        };
        tracing::dispatcher::with_default(&self.dispatch, || {
            if level == Level::ERROR {
                tracing::error!("{}", message);
            } else if level == Level::WARN {
                tracing::warn!("{}", message);
            } else if level == Level::INFO {
                tracing::info!("{}", message);
            } else if level == Level::DEBUG {
                tracing::debug!("{}", message);
            } else {
                tracing::trace!("{}", message);
            }
        });
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Build the logger for job `name`. Fails only if the log file cannot be opened.
pub fn build_job_logger(name: &str, settings: &JobLogSettings) -> io::Result<JobLogger> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .fmt_fields(debug_fn(write_bare))
        .event_format(LogTemplate::new(name, CONSOLE_FMT, DEFAULT_DATEFMT))
        .with_filter(settings.console_level);

    let file = match &settings.file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(LogFile::open(path, settings.mode)?)
                .with_ansi(false)
                .fmt_fields(debug_fn(write_bare))
                .event_format(LogTemplate::new(name, &settings.fmt, &settings.datefmt))
                .with_filter(LevelFilter::DEBUG),
        ),
        None => None,
    };

    let subscriber = tracing_subscriber::registry().with(console).with(file);
    Ok(JobLogger {
        name: name.to_string(),
        dispatch: Dispatch::new(subscriber),
        distinguish_debug: settings.distinguish_debug,
    })
}
