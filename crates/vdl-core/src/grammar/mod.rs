//! Command-line grammar of the download engine.
//!
//! The engine parses option tokens itself (see
//! [`YtDlpGrammar`](crate::engine::YtDlpGrammar)); this module keeps what is
//! done with its answer: the delta against the engine's defaults, and the
//! errors it reports mapped onto [`OptionGrammarError`].

use serde_json::{Map, Value};
use thiserror::Error;

/// Option key holding the list of post-processing steps.
pub const POSTPROCESSORS: &str = "postprocessors";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionGrammarError {
    #[error("no such option: {0}")]
    NoSuchOption(String),
    #[error("ambiguous option: {option} ({})", .candidates.join(", "))]
    Ambiguous {
        option: String,
        candidates: Vec<String>,
    },
    #[error("{0} option requires an argument")]
    MissingValue(String),
    #[error("{0} option does not take a value")]
    UnexpectedValue(String),
    #[error("option {option}: {reason}")]
    InvalidValue { option: String, reason: String },
    #[error("option token #{index} is not a string: {token}")]
    NotAString { index: usize, token: String },
    /// The engine refused the options for a reason not covered above.
    #[error("{0}")]
    Rejected(String),
    #[error("cannot query the engine's option grammar: {0}")]
    Unavailable(String),
}

impl OptionGrammarError {
    /// Classify an error message from the engine's argument parser.
    pub fn from_engine_message(message: &str) -> Self {
        let message = message.trim();
        if let Some(option) = message.strip_prefix("no such option: ") {
            return Self::NoSuchOption(option.to_string());
        }
        if let Some(rest) = message.strip_prefix("ambiguous option: ") {
            if let Some((option, list)) = rest.split_once(" (") {
                let list = list.trim_end_matches(')').trim_end_matches('?');
                return Self::Ambiguous {
                    option: option.to_string(),
                    candidates: list.split(", ").map(str::to_string).collect(),
                };
            }
        }
        if let Some((option, _)) = message.split_once(" option requires ") {
            return Self::MissingValue(option.to_string());
        }
        if let Some(option) = message.strip_suffix(" option does not take a value") {
            return Self::UnexpectedValue(option.to_string());
        }
        if let Some((option, reason)) = message
            .strip_prefix("option ")
            .and_then(|rest| rest.split_once(": "))
        {
            return Self::InvalidValue {
                option: option.to_string(),
                reason: reason.to_string(),
            };
        }
        Self::Rejected(message.to_string())
    }
}

/// The engine's full option set for an argument list, next to the one it
/// builds from no arguments at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOptions {
    pub options: Map<String, Value>,
    pub defaults: Map<String, Value>,
}

impl ParsedOptions {
    /// Only the options whose value differs from the defaults. Default
    /// post-processing steps are left out of `postprocessors`, and the key is
    /// dropped when no step remains.
    pub fn into_delta(self) -> Map<String, Value> {
        let ParsedOptions { options, defaults } = self;
        let mut delta: Map<String, Value> = options
            .into_iter()
            .filter(|(key, value)| defaults.get(key) != Some(value))
            .collect();

        if let Some(Value::Array(steps)) = delta.get_mut(POSTPROCESSORS) {
            if let Some(Value::Array(default_steps)) = defaults.get(POSTPROCESSORS) {
                steps.retain(|step| !default_steps.contains(step));
            }
            if steps.is_empty() {
                delta.remove(POSTPROCESSORS);
            }
        }
        delta
    }
}

/// Something that parses engine command-line tokens into engine options.
pub trait OptionGrammar {
    fn parse(&self, args: &[&str]) -> Result<ParsedOptions, OptionGrammarError>;

    fn non_default_options(&self, args: &[&str]) -> Result<Map<String, Value>, OptionGrammarError> {
        self.parse(args).map(ParsedOptions::into_delta)
    }
}
