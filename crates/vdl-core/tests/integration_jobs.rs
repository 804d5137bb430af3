//! Integration test: configuration file → job assembly → engine calls.

mod common;

use common::{capture_logs, RecordingEngine, StubGrammar};
use serde_json::json;
use std::fs;
use tempfile::tempdir;
use tracing_subscriber::filter::LevelFilter;
use vdl_core::config::search_configs;
use vdl_core::options::OPTIONS_SENTINEL;
use vdl_core::scheduler::{assemble_jobs, run_jobs, JobState};

#[test]
fn empty_source_runs_engine_once_with_no_urls() {
    let dir = tempdir().unwrap();
    let subdir = dir.path().join("media");
    fs::create_dir(&subdir).unwrap();
    let source = dir.path().join("empty.txt");
    fs::write(&source, "").unwrap();
    let conf = dir.path().join("video-dl.conf");
    fs::write(
        &conf,
        format!(
            "[only]\nSource = {}\nSubDir = {}\n",
            source.display(),
            subdir.display()
        ),
    )
    .unwrap();

    let config = search_configs(Some(conf.as_path())).unwrap().unwrap();
    let assembly = assemble_jobs(&config, &[], &StubGrammar, LevelFilter::OFF);
    assert_eq!(assembly.jobs.len(), 1);
    let outtmpl = assembly.jobs[0].outtmpl().unwrap().to_string();
    assert!(outtmpl.starts_with(&subdir.display().to_string()), "{outtmpl}");

    let mut engine = RecordingEngine::default();
    let summary = run_jobs(assembly, &mut engine);
    assert_eq!(engine.calls.len(), 1);
    assert!(engine.calls[0].urls.is_empty());
    assert_eq!(engine.calls[0].options["outtmpl"], json!(outtmpl));
    assert_eq!(summary.states(), [("only", JobState::Completed)]);
}

#[test]
fn full_configuration_reaches_the_engine() {
    let dir = tempdir().unwrap();
    let media = dir.path().join("media");
    fs::create_dir(&media).unwrap();
    fs::write(
        dir.path().join("channels.txt"),
        "# favourites\nhttps://example.com/c/one\nhttps://example.com/c/two  # weekly\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("opts.json"),
        json!({
            "format": "bestvideo+bestaudio",
            "outtmpl": "%(uploader)s/%(title)s.%(ext)s",
            OPTIONS_SENTINEL: ["--retries", "3", "--embed-metadata"],
        })
        .to_string(),
    )
    .unwrap();
    let log = dir.path().join("talks.log");
    let conf = dir.path().join("video-dl.conf");
    fs::write(
        &conf,
        format!(
            "[DEFAULT]\n\
             Root = {root}\n\
             SubDir = ${{Root}}/media\n\
             \n\
             [talks]\n\
             Source = ${{Root}}/channels.txt\n\
             OptionsFile = ${{Root}}/opts.json\n\
             DownloadArchive = ${{Root}}/archive.txt\n\
             DateStart = 20200101\n\
             DateEnd = 20201231\n\
             Log = {log}\n\
             LogFmt = %(levelname)s %(message)s\n\
             \n\
             [broken]\n\
             SubDir = /dev/null/x\n",
            root = dir.path().display(),
            log = log.display(),
        ),
    )
    .unwrap();

    let config = search_configs(Some(conf.as_path())).unwrap().unwrap();
    let ((summary, engine), logs) = capture_logs(|| {
        let assembly = assemble_jobs(&config, &[], &StubGrammar, LevelFilter::OFF);
        let mut engine = RecordingEngine::default();
        let summary = run_jobs(assembly, &mut engine);
        (summary, engine)
    });

    assert_eq!(
        summary.states(),
        [("broken", JobState::Skipped), ("talks", JobState::Completed)]
    );
    assert!(logs.contains("SubDir is not writable"), "{logs}");

    let call = &engine.calls[0];
    assert_eq!(
        call.urls,
        ["https://example.com/c/one", "https://example.com/c/two"]
    );
    assert_eq!(call.options["format"], json!("bestvideo+bestaudio"));
    assert_eq!(call.options["retries"], json!(3));
    assert_eq!(
        call.options["outtmpl"],
        json!(media.join("%(uploader)s/%(title)s.%(ext)s").display().to_string())
    );
    assert_eq!(
        call.options["download_archive"],
        json!(dir.path().join("archive.txt").display().to_string())
    );
    assert_eq!(
        call.options["postprocessors"],
        json!([{"key": "FFmpegMetadata", "add_metadata": true}])
    );
    assert_eq!(call.options[OPTIONS_SENTINEL], json!(["--retries", "3", "--embed-metadata"]));
    assert_eq!(call.daterange, "DateRange(start='20200101', end='20201231')");

    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "INFO [download] pretending to download\n"
    );
}
