//! Log capture and an engine grammar stand-in for unit tests.

use serde_json::{json, Map, Value};
use std::io;
use std::sync::{Arc, Mutex};

use crate::grammar::{OptionGrammar, OptionGrammarError, ParsedOptions, POSTPROCESSORS};

#[derive(Clone, Default)]
pub(crate) struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return its result plus
/// everything logged at DEBUG or above.
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buf.contents())
}

/// Lines of `logs` at WARN level.
pub(crate) fn warnings(logs: &str) -> Vec<&str> {
    logs.lines().filter(|l| l.contains(" WARN ")).collect()
}

/// Stand-in for the engine's argument parser covering a handful of flags.
pub(crate) struct FakeGrammar;

impl FakeGrammar {
    fn defaults() -> Map<String, Value> {
        let defaults = json!({
            "quiet": false,
            "verbose": false,
            "retries": 10,
            "format": null,
            "postprocessors": [{"key": "FFmpegConcat", "only_multi_video": true, "when": "playlist"}],
        });
        defaults.as_object().cloned().unwrap_or_default()
    }
}

impl OptionGrammar for FakeGrammar {
    fn parse(&self, args: &[&str]) -> Result<ParsedOptions, OptionGrammarError> {
        let defaults = Self::defaults();
        let mut options = defaults.clone();
        let mut steps = Vec::new();
        let mut args = args.iter();
        while let Some(&arg) = args.next() {
            let mut value = || {
                args.next()
                    .copied()
                    .ok_or_else(|| OptionGrammarError::MissingValue(arg.to_string()))
            };
            match arg {
                "-q" | "--quiet" => {
                    options.insert("quiet".into(), json!(true));
                }
                "-v" | "--verbose" => {
                    options.insert("verbose".into(), json!(true));
                }
                "-R" | "--retries" => {
                    let text = value()?;
                    let retries: i64 = text.parse().map_err(|_| OptionGrammarError::InvalidValue {
                        option: arg.to_string(),
                        reason: format!("invalid retry count {text:?}"),
                    })?;
                    options.insert("retries".into(), json!(retries));
                }
                "-f" | "--format" => {
                    options.insert("format".into(), json!(value()?));
                }
                "-x" | "--extract-audio" => steps.push(json!({
                    "key": "FFmpegExtractAudio",
                    "nopostoverwrites": false,
                    "preferredcodec": "best",
                    "preferredquality": "5",
                })),
                "--embed-metadata" => steps.push(json!({
                    "key": "FFmpegMetadata",
                    "add_chapters": false,
                    "add_metadata": true,
                    "add_infojson": "if_exists",
                })),
                other if other.starts_with('-') => {
                    return Err(OptionGrammarError::NoSuchOption(other.to_string()))
                }
                _ => {}
            }
        }
        if let Some(Value::Array(default_steps)) = defaults.get(POSTPROCESSORS) {
            steps.extend(default_steps.iter().cloned());
        }
        options.insert(POSTPROCESSORS.into(), Value::Array(steps));
        Ok(ParsedOptions { options, defaults })
    }
}
