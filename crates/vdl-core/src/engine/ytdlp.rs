//! yt-dlp run through a Python driver in a child process: both the download
//! engine and the grammar its option tokens are parsed with.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::env;
use std::ffi::OsString;

use super::process::run_driver;
use super::{engine_level, DownloadEngine, DownloadRequest, EngineError, ProgressEvent};
use crate::daterange::format_date;
use crate::grammar::{OptionGrammar, OptionGrammarError, ParsedOptions};
use crate::options::OPTIONS_SENTINEL;

/// Environment variable naming the Python interpreter to run.
pub const PYTHON_ENV: &str = "VIDEO_DL_PYTHON";

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DriverMessage {
    Log { level: String, msg: String },
    Progress(ProgressEvent),
    Result { code: i32 },
    Options {
        options: Map<String, Value>,
        defaults: Map<String, Value>,
    },
    GrammarError { msg: String },
    Unavailable { msg: String },
}

/// `$VIDEO_DL_PYTHON`, else `python3`.
fn default_interpreter() -> OsString {
    env::var_os(PYTHON_ENV)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| OsString::from("python3"))
}

#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    python: OsString,
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpEngine {
    pub fn new() -> Self {
        Self::with_interpreter(default_interpreter())
    }

    pub fn with_interpreter(python: impl Into<OsString>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// The option grammar of the yt-dlp this engine runs.
    pub fn grammar(&self) -> YtDlpGrammar {
        YtDlpGrammar {
            python: self.python.clone(),
        }
    }
}

impl DownloadEngine for YtDlpEngine {
    fn download(&mut self, request: DownloadRequest<'_>) -> Result<i32, EngineError> {
        let mut params = request.options;
        // The driver rebuilds values that do not survive JSON from the tokens.
        let cli = params.remove(OPTIONS_SENTINEL);
        let payload = serde_json::to_vec(&json!({
            "action": "download",
            "params": params,
            "cli": cli,
            "urls": request.urls,
            "daterange": {
                "start": format_date(request.daterange.start()),
                "end": format_date(request.daterange.end()),
            },
        }))?;

        tracing::debug!(
            "starting engine: {} ({} urls)",
            self.python.to_string_lossy(),
            request.urls.len()
        );
        let logger = request.logger;
        let progress = request.progress;
        let mut code = None;
        let status = run_driver(&self.python, &payload, |line| {
            match serde_json::from_str::<DriverMessage>(line) {
                Ok(DriverMessage::Log { level, msg }) => logger.log(engine_level(&level), &msg),
                Ok(DriverMessage::Progress(event)) => progress(&event),
                Ok(DriverMessage::Result { code: c }) => code = Some(c),
                _ => logger.info(line),
            }
        })?;

        code.ok_or_else(|| EngineError::NoResult {
            status: status.to_string(),
        })
    }
}

/// Parses option tokens with yt-dlp's own command-line parser.
#[derive(Debug, Clone)]
pub struct YtDlpGrammar {
    python: OsString,
}

impl Default for YtDlpGrammar {
    fn default() -> Self {
        YtDlpEngine::new().grammar()
    }
}

impl OptionGrammar for YtDlpGrammar {
    fn parse(&self, args: &[&str]) -> Result<ParsedOptions, OptionGrammarError> {
        let payload = serde_json::to_vec(&json!({"action": "parse", "args": args}))
            .map_err(|e| OptionGrammarError::Unavailable(e.to_string()))?;

        let mut answer = None;
        let status = run_driver(&self.python, &payload, |line| {
            match serde_json::from_str::<DriverMessage>(line) {
                Ok(DriverMessage::Options { options, defaults }) => {
                    answer = Some(Ok(ParsedOptions { options, defaults }))
                }
                Ok(DriverMessage::GrammarError { msg }) => {
                    answer = Some(Err(OptionGrammarError::from_engine_message(&msg)))
                }
                Ok(DriverMessage::Unavailable { msg }) => {
                    answer = Some(Err(OptionGrammarError::Unavailable(msg)))
                }
                _ => tracing::debug!("engine: {}", line),
            }
        })
        .map_err(|e| OptionGrammarError::Unavailable(e.to_string()))?;

        answer.unwrap_or_else(|| {
            Err(OptionGrammarError::Unavailable(format!(
                "engine exited ({status}) without parsing the options"
            )))
        })
    }
}
