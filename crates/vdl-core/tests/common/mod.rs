//! Helpers shared by the integration tests: a recording engine, a small
//! stand-in for the engine's option grammar, and log capture.

use std::io;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use vdl_core::engine::{DownloadEngine, DownloadRequest, EngineError};
use vdl_core::grammar::{OptionGrammar, OptionGrammarError, ParsedOptions};

/// One engine call as seen by [`RecordingEngine`].
#[derive(Debug, Clone)]
pub struct Call {
    pub urls: Vec<String>,
    pub options: serde_json::Map<String, serde_json::Value>,
    pub daterange: String,
}

/// Engine that records every request and reports success.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
}

impl DownloadEngine for RecordingEngine {
    fn download(&mut self, request: DownloadRequest<'_>) -> Result<i32, EngineError> {
        request.logger.info("[download] pretending to download");
        self.calls.push(Call {
            urls: request.urls.to_vec(),
            options: request.options,
            daterange: request.daterange.to_string(),
        });
        Ok(0)
    }
}

/// Knows `--retries N` and `--embed-metadata`; every other flag is unknown.
pub struct StubGrammar;

impl OptionGrammar for StubGrammar {
    fn parse(&self, args: &[&str]) -> Result<ParsedOptions, OptionGrammarError> {
        let defaults = json!({"retries": 10, "postprocessors": []});
        let mut options = defaults.clone();
        let mut args = args.iter();
        while let Some(&arg) = args.next() {
            match arg {
                "--retries" => {
                    let n = args
                        .next()
                        .and_then(|v| v.parse::<i64>().ok())
                        .ok_or_else(|| OptionGrammarError::MissingValue(arg.into()))?;
                    options["retries"] = json!(n);
                }
                "--embed-metadata" => {
                    if let Value::Array(steps) = &mut options["postprocessors"] {
                        steps.push(json!({"key": "FFmpegMetadata", "add_metadata": true}));
                    }
                }
                other => return Err(OptionGrammarError::NoSuchOption(other.into())),
            }
        }
        Ok(ParsedOptions {
            options: options.as_object().cloned().unwrap_or_default(),
            defaults: defaults.as_object().cloned().unwrap_or_default(),
        })
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with logs captured at DEBUG and above.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buf.0.lock().unwrap()).into_owned();
    (out, logs)
}
