//! Reader for the `configparser`-style INI dialect used by VideoDL.conf.
//!
//! Supported: `[section]` headers, `key = value` and `key: value`, full-line
//! `#`/`;` comments, indented continuation lines, and a `DEFAULT` section.
//! Keys are case-insensitive (stored lowercased); section names are not.
//! Duplicate sections or keys within one file are errors.

use std::collections::BTreeMap;

use super::ConfigError;

pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Uninterpolated key/value pairs, in section order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawConfig {
    pub defaults: BTreeMap<String, String>,
    pub sections: Vec<(String, BTreeMap<String, String>)>,
}

impl RawConfig {
    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        if name == DEFAULT_SECTION {
            return Some(&self.defaults);
        }
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values)
    }

    /// Merge a later file over this one: new sections are appended, existing
    /// keys are overridden.
    pub fn merge(&mut self, other: RawConfig) {
        self.defaults.extend(other.defaults);
        for (name, values) in other.sections {
            match self.sections.iter_mut().find(|(n, _)| *n == name) {
                Some((_, existing)) => existing.extend(values),
                None => self.sections.push((name, values)),
            }
        }
    }
}

/// Parse one file's text. `origin` names the file in error messages.
pub fn parse(origin: &str, text: &str) -> Result<RawConfig, ConfigError> {
    let mut raw = RawConfig::default();
    // Index into raw.sections, or None for DEFAULT.
    let mut current: Option<Option<usize>> = None;
    let mut last_key: Option<String> = None;
    let mut seen_default = false;

    let syntax = |line: usize, message: String| ConfigError::Syntax {
        origin: origin.to_string(),
        line,
        message,
    };

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            last_key = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.starts_with(char::is_whitespace);
        if indented {
            if let (Some(section), Some(key)) = (current, last_key.as_ref()) {
                let values = match section {
                    None => &mut raw.defaults,
                    Some(i) => &mut raw.sections[i].1,
                };
                if let Some(value) = values.get_mut(key) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                }
                continue;
            }
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() > 2 {
            let name = &trimmed[1..trimmed.len() - 1];
            last_key = None;
            if name == DEFAULT_SECTION {
                if seen_default {
                    return Err(syntax(lineno, format!("section {name:?} already exists")));
                }
                seen_default = true;
                current = Some(None);
            } else {
                if raw.sections.iter().any(|(n, _)| n == name) {
                    return Err(syntax(lineno, format!("section {name:?} already exists")));
                }
                raw.sections.push((name.to_string(), BTreeMap::new()));
                current = Some(Some(raw.sections.len() - 1));
            }
            continue;
        }

        let Some(section) = current else {
            return Err(syntax(lineno, "file contains no section headers".to_string()));
        };

        let Some(split) = trimmed.find(['=', ':']) else {
            return Err(syntax(lineno, format!("expected 'key = value', found {trimmed:?}")));
        };
        let key = trimmed[..split].trim().to_lowercase();
        let value = trimmed[split + 1..].trim().to_string();
        if key.is_empty() {
            return Err(syntax(lineno, "empty key".to_string()));
        }

        let values = match section {
            None => &mut raw.defaults,
            Some(i) => &mut raw.sections[i].1,
        };
        if values.contains_key(&key) {
            return Err(syntax(lineno, format!("option {key:?} already exists in section")));
        }
        values.insert(key.clone(), value);
        last_key = Some(key);
    }

    Ok(raw)
}
