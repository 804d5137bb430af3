//! Reading an options file (JSON, or YAML by suffix).

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{JobOptions, OptionsError};

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Parser for YAML text, when the crate is built with YAML support.
type YamlParser = fn(&str) -> Result<Value, String>;

#[cfg(feature = "yaml")]
fn parse_yaml(text: &str) -> Result<Value, String> {
    serde_yaml::from_str(text).map_err(|e| e.to_string())
}

#[cfg(feature = "yaml")]
fn yaml_parser() -> Option<YamlParser> {
    Some(parse_yaml)
}

#[cfg(not(feature = "yaml"))]
fn yaml_parser() -> Option<YamlParser> {
    None
}

/// Load the options object at `path`. No path (or an empty one) is an empty
/// set of options, not an error.
pub fn load_options(path: Option<&str>) -> Result<JobOptions, OptionsError> {
    load_options_with(path, yaml_parser())
}

/// [`load_options`] with YAML files read by `yaml`. Without a YAML parser
/// they are read as JSON after a warning.
fn load_options_with(
    path: Option<&str>,
    yaml: Option<YamlParser>,
) -> Result<JobOptions, OptionsError> {
    let Some(path) = path.filter(|p| !p.trim().is_empty()) else {
        return Ok(JobOptions::new());
    };
    let path = Path::new(path);
    let text = fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| OptionsError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let value: Value = match (is_yaml(path), yaml) {
        (true, Some(parse)) => parse(&text).map_err(parse_error)?,
        (true, None) => {
            tracing::warn!(
                "YAML support not built in, reading {} as JSON",
                path.display()
            );
            serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?
        }
        (false, _) => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
    };
    match value {
        Value::Object(map) => Ok(map),
        other => Err(parse_error(format!(
            "expected an object at the top level, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
