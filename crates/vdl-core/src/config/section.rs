//! Typed access to one configuration section.
//!
//! Getters never fail: an invalid value is logged as a warning naming the key
//! and the offending text, and a documented default is used instead.

use std::collections::BTreeMap;

use crate::daterange::DateRange;
use crate::duration::TimeInterval;

use super::values::{parse_boolean, LogMode};

/// Borrowed view of a section's resolved values (own keys plus `DEFAULT`).
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    name: &'a str,
    values: &'a BTreeMap<String, String>,
}

impl<'a> Section<'a> {
    pub(crate) fn new(name: &'a str, values: &'a BTreeMap<String, String>) -> Self {
        Self { name, values }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Like [`Section::get`], but a missing key is logged as an error.
    pub fn get_required(&self, key: &str) -> Option<&'a str> {
        let value = self.get(key);
        if value.is_none() {
            tracing::error!("required key {:?} not found in section", key);
        }
        value
    }

    /// Missing keys yield `default` silently; unrecognized values warn.
    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match parse_boolean(raw) {
            Some(value) => value,
            None => {
                tracing::warn!(
                    "unrecognized boolean value for {}: '{}' (defaulting to {})",
                    key,
                    raw,
                    default
                );
                default
            }
        }
    }

    pub fn parse_log_mode(&self, key: &str) -> LogMode {
        let raw = self.get(key).unwrap_or_default();
        LogMode::parse(raw).unwrap_or_else(|| {
            tracing::warn!("unrecognized {} {:?}, defaulting to overwrite", key, raw);
            LogMode::Write
        })
    }

    /// Interval from `"upper"` or `"lower,upper"`; `(0, 0)` when missing or invalid.
    pub fn parse_interval(&self, key: &str) -> TimeInterval {
        let raw = self.get(key).unwrap_or_default();
        TimeInterval::parse(raw).unwrap_or_else(|err| {
            tracing::warn!("invalid argument to {}: {} ({})", key, raw, err);
            TimeInterval::default()
        })
    }

    /// Publish-date filter from two optional bound keys.
    pub fn get_date_range(&self, start: &str, end: &str) -> DateRange {
        DateRange::from_config(self.get(start), self.get(end), start, end)
    }
}
