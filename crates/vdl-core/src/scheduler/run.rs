//! Running assembled jobs one after another.

use std::thread;
use std::time::{Duration as StdDuration, Instant};

use super::assemble::Assembly;
use super::job::{report_progress, JobDescriptor, JobState};
use crate::duration::format_duration;
use crate::engine::{DownloadEngine, DownloadRequest, ProgressEvent};

/// What happened to every job of a run.
#[derive(Debug)]
pub struct RunSummary {
    pub jobs: Vec<JobDescriptor>,
    pub skipped: Vec<String>,
    /// Wall-clock time of the whole run, sleeps included.
    pub elapsed: StdDuration,
}

impl RunSummary {
    /// Jobs the engine reported failures for.
    pub fn failed(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.had_error || j.status != Some(0))
            .count()
    }

    /// `(name, state)` of skipped sections followed by the jobs that ran.
    pub fn states(&self) -> Vec<(&str, JobState)> {
        self.skipped
            .iter()
            .map(|name| (name.as_str(), JobState::Skipped))
            .chain(self.jobs.iter().map(|j| (j.name.as_str(), j.state)))
            .collect()
    }
}

/// Run every job in order, sleeping first where a job asks for it.
pub fn run_jobs(assembly: Assembly, engine: &mut dyn DownloadEngine) -> RunSummary {
    run_jobs_with_sleep(assembly, engine, thread::sleep)
}

/// [`run_jobs`] with the sleeping done by `sleep`.
pub fn run_jobs_with_sleep<F>(
    assembly: Assembly,
    engine: &mut dyn DownloadEngine,
    mut sleep: F,
) -> RunSummary
where
    F: FnMut(StdDuration),
{
    let start = Instant::now();
    let mut jobs = assembly.jobs;
    for job in &mut jobs {
        let _span = tracing::info_span!("job", section = %job.name).entered();

        if !job.sleep.is_zero() {
            let wait = job.sleep.random_duration();
            tracing::info!("sleeping for {} before starting", wait);
            sleep(wait.to_std());
        }

        job.state = JobState::Running;
        tracing::info!("starting job with {} urls", job.urls.len());
        run_one(job, engine);
        job.state = JobState::Completed;
    }

    let elapsed = start.elapsed();
    tracing::info!("finished all jobs in {}", format_duration(elapsed.as_secs_f64()));
    RunSummary {
        jobs,
        skipped: assembly.skipped,
        elapsed,
    }
}

fn run_one(job: &mut JobDescriptor, engine: &mut dyn DownloadEngine) {
    let logger = &job.logger;
    let mut had_error = false;
    let mut progress = |event: &ProgressEvent| {
        if report_progress(logger, event) {
            had_error = true;
        }
    };
    let result = engine.download(DownloadRequest {
        options: job.options.resolve(),
        urls: &job.urls,
        daterange: job.daterange,
        logger,
        progress: &mut progress,
    });

    match result {
        Ok(0) => job.status = Some(0),
        Ok(code) => {
            tracing::error!("some videos failed to download (status {})", code);
            job.status = Some(code);
        }
        Err(err) => {
            tracing::error!("download engine failed: {}", err);
            had_error = true;
        }
    }
    job.had_error |= had_error;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::{EngineError, ProgressStatus};
    use crate::scheduler::assemble_jobs;
    use crate::test_support::{capture_logs, FakeGrammar};
    use std::collections::VecDeque;
    use std::fs;
    use tracing_subscriber::filter::LevelFilter;

    /// Engine that records its calls and answers with canned results
    /// (`Err` stands for an engine failure); 0 once they run out.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Vec<String>, Option<String>)>,
        results: VecDeque<Result<i32, ()>>,
        report_error: bool,
    }

    impl DownloadEngine for Recorder {
        fn download(&mut self, request: DownloadRequest<'_>) -> Result<i32, EngineError> {
            let outtmpl = request
                .options
                .get("outtmpl")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            self.calls.push((request.urls.to_vec(), outtmpl));
            if self.report_error {
                (request.progress)(&ProgressEvent::new(ProgressStatus::Error));
            }
            match self.results.pop_front() {
                None => Ok(0),
                Some(Ok(code)) => Ok(code),
                Some(Err(())) => Err(EngineError::NoResult {
                    status: "exit status: 1".into(),
                }),
            }
        }
    }

    fn assembly(dir: &tempfile::TempDir, sections: &str) -> Assembly {
        fs::write(dir.path().join("urls.txt"), "https://a\n").unwrap();
        let text = format!(
            "[DEFAULT]\nSubDir = {}\nSource = {}\n{}",
            dir.path().display(),
            dir.path().join("urls.txt").display(),
            sections
        );
        let config = Config::parse_str("test", &text).unwrap();
        assemble_jobs(&config, &[], &FakeGrammar, LevelFilter::OFF)
    }

    fn no_sleep(_: StdDuration) {
        panic!("no job asked to sleep");
    }

    #[test]
    fn runs_jobs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let assembly = assembly(&dir, "[one]\n[two]\n");
        let mut engine = Recorder::default();
        let (summary, logs) =
            capture_logs(|| run_jobs_with_sleep(assembly, &mut engine, no_sleep));

        assert_eq!(engine.calls.len(), 2);
        assert_eq!(engine.calls[0].0, ["https://a"]);
        let outtmpl = engine.calls[0].1.as_deref().unwrap();
        assert!(outtmpl.starts_with(&dir.path().display().to_string()));
        assert_eq!(
            summary.states(),
            [("one", JobState::Completed), ("two", JobState::Completed)]
        );
        assert_eq!(summary.failed(), 0);
        assert!(logs.contains("finished all jobs in"), "{logs}");
    }

    #[test]
    fn partial_failure_is_logged_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let assembly = assembly(&dir, "[one]\n[two]\n[three]\n");
        let mut engine = Recorder {
            results: VecDeque::from([Ok(1), Err(()), Ok(0)]),
            ..Default::default()
        };
        let (summary, logs) =
            capture_logs(|| run_jobs_with_sleep(assembly, &mut engine, no_sleep));

        assert_eq!(engine.calls.len(), 3);
        assert!(logs.contains("some videos failed to download"), "{logs}");
        assert!(logs.contains("download engine failed"), "{logs}");
        assert_eq!(summary.jobs[0].status, Some(1));
        assert_eq!(summary.jobs[1].status, None);
        assert!(summary.jobs[1].had_error);
        assert_eq!(summary.jobs[2].status, Some(0));
        assert_eq!(summary.failed(), 2);
    }

    #[test]
    fn progress_errors_mark_the_job() {
        let dir = tempfile::tempdir().unwrap();
        let assembly = assembly(&dir, "[one]\n");
        let mut engine = Recorder {
            report_error: true,
            ..Default::default()
        };
        let summary = run_jobs_with_sleep(assembly, &mut engine, no_sleep);
        assert!(summary.jobs[0].had_error);
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn sleeps_within_interval_before_starting() {
        let dir = tempfile::tempdir().unwrap();
        let assembly = assembly(&dir, "[slow]\nSleepInterval = 2,3\n");
        let mut engine = Recorder::default();
        let mut slept = Vec::new();
        let (_, logs) = capture_logs(|| {
            run_jobs_with_sleep(assembly, &mut engine, |d| slept.push(d))
        });
        assert_eq!(slept.len(), 1);
        assert!((2.0..=3.0).contains(&slept[0].as_secs_f64()), "{:?}", slept);
        assert!(logs.contains("before starting"), "{logs}");
    }

    #[test]
    fn skipped_sections_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let assembly = assembly(&dir, "[bad]\nSubDir = \n[good]\n");
        let mut engine = Recorder::default();
        let summary = run_jobs_with_sleep(assembly, &mut engine, no_sleep);
        assert_eq!(
            summary.states(),
            [("bad", JobState::Skipped), ("good", JobState::Completed)]
        );
    }
}
