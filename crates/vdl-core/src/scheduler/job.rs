//! One job: what to download, how, and where it is in its run.

use crate::daterange::DateRange;
use crate::duration::TimeInterval;
use crate::engine::{ProgressEvent, ProgressStatus};
use crate::logging::JobLogger;
use crate::options::Options;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Skipped,
    Running,
    Completed,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Skipped => "skipped",
            JobState::Running => "running",
            JobState::Completed => "completed",
        }
    }
}

/// A job's complete input, built from one configuration section.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    pub name: String,
    pub urls: Vec<String>,
    pub options: Options,
    /// Random sleep before the job starts.
    pub sleep: TimeInterval,
    pub daterange: DateRange,
    pub logger: JobLogger,
    pub state: JobState,
    /// Set once the engine reports an error for any file of this job.
    pub had_error: bool,
    /// Engine status once the job ran; `None` if it never got one.
    pub status: Option<i32>,
}

impl JobDescriptor {
    /// Output path template handed to the engine.
    pub fn outtmpl(&self) -> Option<&str> {
        self.options.get("outtmpl").and_then(|v| v.as_str())
    }
}

/// Log an engine progress report on the job logger. Returns true for errors.
pub fn report_progress(logger: &JobLogger, event: &ProgressEvent) -> bool {
    match event.status {
        ProgressStatus::Error => {
            logger.error("error with job");
            true
        }
        ProgressStatus::Finished => {
            logger.info(&format!(
                "Done downloading, now converting: {}",
                event.title.as_deref().unwrap_or("<unknown>")
            ));
            logger.debug(&format!(
                "finished {} (temporary file {}, {} bytes in {:.1}s)",
                event.filename.as_deref().unwrap_or("?"),
                event.tmpfilename.as_deref().unwrap_or("?"),
                event.downloaded_bytes.unwrap_or(0),
                event.elapsed.unwrap_or(0.0),
            ));
            false
        }
        ProgressStatus::Downloading => false,
    }
}
