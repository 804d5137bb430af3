//! Job scheduler.
//!
//! Turns configuration sections into job descriptors, then runs them one at
//! a time: optional random sleep, one blocking engine call, result logging.
//! Jobs share no state; a skipped or failed job never stops the others.

mod assemble;
mod job;
mod run;

pub use assemble::{assemble_job, assemble_jobs, Assembly, DEFAULT_OUTTMPL};
pub use job::{report_progress, JobDescriptor, JobState};
pub use run::{run_jobs, run_jobs_with_sleep, RunSummary};
