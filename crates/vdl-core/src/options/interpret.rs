//! Turning the sentinel token list into an overlay.

use serde_json::Value;

use super::{JobOptions, LayeredOptions, Options, OPTIONS_SENTINEL};
use crate::grammar::{OptionGrammar, OptionGrammarError, POSTPROCESSORS};

/// Interpret the command-line tokens stored under [`OPTIONS_SENTINEL`].
///
/// Without the sentinel (or with an empty token list) the options are
/// returned as they are. A sentinel that is not an array is ignored with a
/// warning. Otherwise only the options that differ from the engine defaults
/// go into an overlay; new post-processing steps are appended after the ones
/// already in the file.
pub fn interpret_options(
    options: JobOptions,
    grammar: &dyn OptionGrammar,
) -> Result<Options, OptionGrammarError> {
    let tokens = match options.get(OPTIONS_SENTINEL) {
        None => return Ok(Options::Plain(options)),
        Some(Value::Array(tokens)) if tokens.is_empty() => return Ok(Options::Plain(options)),
        Some(Value::Array(tokens)) => tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                token
                    .as_str()
                    .ok_or_else(|| OptionGrammarError::NotAString {
                        index,
                        token: token.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            tracing::warn!(
                "ignoring {:?}: expected a list of options, got {}",
                OPTIONS_SENTINEL,
                other
            );
            return Ok(Options::Plain(options));
        }
    };

    let mut delta = grammar.non_default_options(&tokens)?;
    let shown = serde_json::to_string(&delta).unwrap_or_default();
    tracing::debug!("options from {:?}: {}", OPTIONS_SENTINEL, shown);

    if let Some(Value::Array(added)) = delta.remove(POSTPROCESSORS) {
        let mut steps = match options.get(POSTPROCESSORS) {
            Some(Value::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        steps.extend(added);
        delta.insert(POSTPROCESSORS.to_string(), Value::Array(steps));
    }
    Ok(Options::Layered(LayeredOptions::new(options, delta)))
}
