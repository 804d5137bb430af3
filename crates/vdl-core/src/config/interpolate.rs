//! `${key}` / `${section:key}` interpolation (configparser's "extended" style).

use std::collections::BTreeMap;

use super::ini::{RawConfig, DEFAULT_SECTION};
use super::ConfigError;

const MAX_DEPTH: usize = 10;

/// Resolve every value of `section` (its own keys plus inherited defaults).
pub fn resolve_section(
    raw: &RawConfig,
    section: &str,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut keys: Vec<&String> = raw.defaults.keys().collect();
    if let Some(own) = raw.section(section) {
        keys.extend(own.keys());
    }
    let mut out = BTreeMap::new();
    for key in keys {
        if out.contains_key(key) {
            continue;
        }
        if let Some(value) = lookup(raw, section, key) {
            let resolved = interpolate(raw, section, key, value, 1)?;
            out.insert(key.clone(), resolved);
        }
    }
    Ok(out)
}

fn lookup<'a>(raw: &'a RawConfig, section: &str, key: &str) -> Option<&'a str> {
    raw.section(section)
        .and_then(|values| values.get(key))
        .or_else(|| raw.defaults.get(key))
        .map(String::as_str)
}

fn interpolate(
    raw: &RawConfig,
    section: &str,
    key: &str,
    value: &str,
    depth: usize,
) -> Result<String, ConfigError> {
    let error = |message: String| ConfigError::Interpolation {
        section: section.to_string(),
        key: key.to_string(),
        message,
    };
    if depth > MAX_DEPTH {
        return Err(error(format!(
            "recursion limit exceeded while expanding {value:?}"
        )));
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        if let Some(after) = rest.strip_prefix('$') {
            out.push('$');
            rest = after;
            continue;
        }
        let Some(body) = rest.strip_prefix('{') else {
            return Err(error(format!("'$' must be followed by '$' or '{{', found {rest:?}")));
        };
        let Some(end) = body.find('}') else {
            return Err(error(format!("unterminated reference in {value:?}")));
        };
        let reference = &body[..end];
        rest = &body[end + 1..];

        let (target_section, target_key) = match reference.split_once(':') {
            None => (section, reference),
            Some((s, k)) if !k.contains(':') => (s, k),
            Some(_) => {
                return Err(error(format!("more than one ':' found in ${{{reference}}}")));
            }
        };
        let target_key = target_key.to_lowercase();
        if target_section != section
            && target_section != DEFAULT_SECTION
            && raw.section(target_section).is_none()
        {
            return Err(error(format!("no section {target_section:?} for ${{{reference}}}")));
        }
        let Some(target) = lookup(raw, target_section, &target_key) else {
            return Err(error(format!(
                "option {target_key:?} not found in section {target_section:?}"
            )));
        };
        let expanded = interpolate(raw, target_section, &target_key, target, depth + 1)
            .map_err(|err| match err {
                ConfigError::Interpolation { message, .. } => error(message),
                other => other,
            })?;
        out.push_str(&expanded);
    }
    out.push_str(rest);
    Ok(out)
}
