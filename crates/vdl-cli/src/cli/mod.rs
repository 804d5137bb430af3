//! CLI for VideoDL: pick jobs from the configuration and run them.

use anyhow::Result;
use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use tracing::level_filters::LevelFilter;

use vdl_core::config::{self, Config, ConfigError};
use vdl_core::duration::{Duration, TimeInterval};
use vdl_core::engine::{DownloadEngine, YtDlpEngine};
use vdl_core::grammar::OptionGrammar;
use vdl_core::logging::{self, MasterLogOptions};
use vdl_core::scheduler::{assemble_jobs, run_jobs, RunSummary};

/// Exit status when no configuration could be read or it is malformed.
pub const EXIT_CONFIG: u8 = 100;

/// Download the media listed by each configured job.
#[derive(Debug, Parser)]
#[command(name = "video-dl", version)]
#[command(about = "VideoDL: configuration-driven batch video downloader", long_about = None)]
#[command(group(ArgGroup::new("verbosity").args(["debug", "quiet"])))]
pub struct Cli {
    /// Sections of the configuration to run (all of them when omitted).
    #[arg(value_name = "JOB")]
    pub jobs: Vec<String>,

    /// Configuration file (absolute path, or a name looked up in the usual places).
    #[arg(short = 'C', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug messages.
    #[arg(short, long)]
    pub debug: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Sleep a random time of up to SEC seconds before starting.
    #[arg(short, long, value_name = "SEC")]
    pub sleep: Option<Duration>,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::DEBUG
        } else if self.quiet {
            LevelFilter::WARN
        } else {
            LevelFilter::INFO
        }
    }
}

pub fn run_from_args() -> Result<ExitCode> {
    let cli = Cli::parse();
    let level = cli.log_level();

    let config = match load_config(cli.config.as_deref()) {
        Ok(Some(config)) => config,
        Ok(None) => {
            logging::init_logging_stderr(level);
            tracing::error!("no config file found");
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
        Err(err) => {
            logging::init_logging_stderr(level);
            tracing::error!("malformed config file: {}", err);
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };

    let master = MasterLogOptions::from_section(&config.defaults());
    if let Err(err) = logging::init_logging(level, &master) {
        logging::init_logging_stderr(level);
        tracing::warn!("master log disabled: {:#}", err);
    }
    tracing::debug!("read config files: {:?}", config.paths());

    let mut engine = YtDlpEngine::new();
    let grammar = engine.grammar();
    let summary = run(&cli, &config, &grammar, &mut engine);
    tracing::debug!(
        "{} jobs ran, {} skipped, {} with failures",
        summary.jobs.len(),
        summary.skipped.len(),
        summary.failed()
    );
    Ok(ExitCode::SUCCESS)
}

/// `--config` with `~` expanded, or the default search.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    let expanded = path.map(config::expand_user);
    config::search_configs(expanded.as_deref())
}

/// Global sleep, then every selected job.
pub fn run(
    cli: &Cli,
    config: &Config,
    grammar: &dyn OptionGrammar,
    engine: &mut dyn DownloadEngine,
) -> RunSummary {
    if let Some(max) = cli.sleep {
        let wait = TimeInterval::new(Duration::ZERO, max).random_duration();
        tracing::info!("sleeping for {}", wait);
        thread::sleep(wait.to_std());
    }
    let assembly = assemble_jobs(config, &cli.jobs, grammar, cli.log_level());
    run_jobs(assembly, engine)
}
