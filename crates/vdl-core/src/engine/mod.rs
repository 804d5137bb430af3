//! Boundary to the download engine.
//!
//! The engine gets fully resolved options and a URL list, reports log records
//! and progress while it runs, and returns a status: 0 when every URL was
//! downloaded, non-zero when some failed.

mod process;
mod ytdlp;

pub use ytdlp::{YtDlpEngine, YtDlpGrammar, PYTHON_ENV};

use serde::Deserialize;
use std::io;
use thiserror::Error;
use tracing::Level;

use crate::daterange::DateRange;
use crate::logging::JobLogger;
use crate::options::JobOptions;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("engine i/o: {0}")]
    Io(#[from] io::Error),
    #[error("cannot encode engine request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("engine exited ({status}) without reporting a result")]
    NoResult { status: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Downloading,
    Error,
    Finished,
}

/// Progress report for one file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub tmpfilename: Option<String>,
    #[serde(default)]
    pub downloaded_bytes: Option<u64>,
    #[serde(default)]
    pub elapsed: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

impl ProgressEvent {
    pub fn new(status: ProgressStatus) -> Self {
        Self {
            status,
            filename: None,
            tmpfilename: None,
            downloaded_bytes: None,
            elapsed: None,
            title: None,
            video_id: None,
        }
    }
}

/// Everything the engine needs for one job.
pub struct DownloadRequest<'a> {
    pub options: JobOptions,
    pub urls: &'a [String],
    pub daterange: DateRange,
    pub logger: &'a JobLogger,
    pub progress: &'a mut dyn FnMut(&ProgressEvent),
}

pub trait DownloadEngine {
    /// Download every URL of `request`, blocking until done.
    fn download(&mut self, request: DownloadRequest<'_>) -> Result<i32, EngineError>;
}

/// Level of an engine log record name; unknown names are info.
pub fn engine_level(name: &str) -> Level {
    match name.to_ascii_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "warning" | "warn" => Level::WARN,
        "error" | "critical" => Level::ERROR,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}
