//! Building job descriptors from configuration sections.
//!
//! Every step may skip the job. A skipped job is logged with its section
//! name and does not affect the others.

use rand::seq::SliceRandom;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

use super::job::{JobDescriptor, JobState};
use crate::config::{Config, Section};
use crate::grammar::OptionGrammar;
use crate::logging::{build_job_logger, JobLogSettings};
use crate::options::{interpret_options, load_options, Options};
use crate::source::read_source;

/// Template used when the options do not name one.
pub const DEFAULT_OUTTMPL: &str = "%(title)s [%(id)s].%(ext)s";

/// Jobs ready to run, plus the sections that were skipped.
#[derive(Debug, Default)]
pub struct Assembly {
    pub jobs: Vec<JobDescriptor>,
    pub skipped: Vec<String>,
}

/// Build jobs for `ids` (every section when empty), in that order. Option
/// tokens in options files are parsed with `grammar`.
pub fn assemble_jobs(
    config: &Config,
    ids: &[String],
    grammar: &dyn OptionGrammar,
    console_level: LevelFilter,
) -> Assembly {
    let names: Vec<&str> = if ids.is_empty() {
        config.sections().collect()
    } else {
        ids.iter().map(String::as_str).collect()
    };
    let mut assembly = Assembly::default();
    for name in names {
        let Some(section) = config.section(name) else {
            tracing::error!("no config section found with name {:?}", name);
            assembly.skipped.push(name.to_string());
            continue;
        };
        match assemble_job(&section, grammar, console_level) {
            Some(job) => assembly.jobs.push(job),
            None => assembly.skipped.push(name.to_string()),
        }
    }
    assembly
}

/// Build the job for one section, or `None` if it has to be skipped.
pub fn assemble_job(
    section: &Section<'_>,
    grammar: &dyn OptionGrammar,
    console_level: LevelFilter,
) -> Option<JobDescriptor> {
    let name = section.name();
    let _span = tracing::info_span!("job", section = %name).entered();

    let subdir = section.get_required("SubDir")?;
    let subdir_path = Path::new(subdir);
    if !is_writable(subdir_path) {
        tracing::warn!("SubDir is not writable: {}", subdir);
        return None;
    }
    if !subdir_path.is_dir() {
        tracing::warn!("SubDir is not a directory: {}", subdir);
        return None;
    }

    let source = section.get_required("Source")?;
    let mut urls = match read_source(Path::new(source)) {
        Ok(urls) => urls,
        Err(err) => {
            tracing::error!("cannot read Source {}: {}", source, err);
            return None;
        }
    };

    let loaded = match load_options(section.get("OptionsFile")) {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!("{}", err);
            return None;
        }
    };
    let mut options = match interpret_options(loaded, grammar) {
        Ok(options) => options,
        Err(err) => {
            tracing::error!("bad options in OptionsFile: {}", err);
            return None;
        }
    };

    if section.get_boolean("ShuffleSource", false) {
        urls.shuffle(&mut rand::thread_rng());
    }

    let outtmpl = output_template(subdir_path, &options);
    tracing::debug!("output template: {}", outtmpl.display());
    options.insert("outtmpl", Value::String(outtmpl.to_string_lossy().into_owned()));
    options.insert(
        "download_archive",
        section
            .get("DownloadArchive")
            .filter(|p| !p.is_empty())
            .map_or(Value::Null, |p| Value::String(p.to_string())),
    );

    let settings = JobLogSettings::from_section(section, console_level);
    let logger = match build_job_logger(name, &settings) {
        Ok(logger) => logger,
        Err(err) => {
            let path = settings.file.clone().unwrap_or_default();
            tracing::error!("cannot open Log {}: {}", path.display(), err);
            return None;
        }
    };

    Some(JobDescriptor {
        name: name.to_string(),
        urls,
        options,
        sleep: section.parse_interval("SleepInterval"),
        daterange: section.get_date_range("DateStart", "DateEnd"),
        logger,
        state: JobState::Pending,
        had_error: false,
        status: None,
    })
}

/// `subdir` joined with the template from the options (or the default),
/// absolute against the current directory.
fn output_template(subdir: &Path, options: &Options) -> PathBuf {
    let fragment = match options.get("outtmpl") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(map)) => map
            .get("default")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_OUTTMPL),
        _ => DEFAULT_OUTTMPL,
    };
    let joined = subdir.join(fragment);
    if joined.is_absolute() {
        return joined;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(joined),
        Err(err) => {
            tracing::warn!("cannot resolve current directory: {}", err);
            joined
        }
    }
}

#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    path.metadata()
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}
