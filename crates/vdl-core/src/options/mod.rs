//! Engine options for a job: loaded from a file, optionally extended by
//! command-line style tokens stored in the file itself.

mod interpret;
mod layered;
mod load;

pub use interpret::interpret_options;
pub use layered::LayeredOptions;
pub use load::load_options;

use serde_json::{Map, Value};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::grammar::OptionGrammarError;

/// Option key whose value is a list of engine command-line tokens.
pub const OPTIONS_SENTINEL: &str = "VideoDL://options";

/// Engine options keyed by option name.
pub type JobOptions = Map<String, Value>;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("cannot read options file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed options file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error(transparent)]
    Grammar(#[from] OptionGrammarError),
}

/// A job's options, either as loaded or with an overlay on top.
#[derive(Debug, Clone, PartialEq)]
pub enum Options {
    Plain(JobOptions),
    Layered(LayeredOptions),
}

impl Default for Options {
    fn default() -> Self {
        Options::Plain(JobOptions::new())
    }
}

impl Options {
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Options::Plain(map) => map.get(key),
            Options::Layered(layered) => layered.get(key),
        }
    }

    /// Set `key`. Layered options take the value into the overlay.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        match self {
            Options::Plain(map) => {
                map.insert(key.into(), value);
            }
            Options::Layered(layered) => layered.insert(key, value),
        }
    }

    /// Flatten into the map handed to the engine.
    pub fn resolve(&self) -> JobOptions {
        match self {
            Options::Plain(map) => map.clone(),
            Options::Layered(layered) => layered.resolve(),
        }
    }
}
