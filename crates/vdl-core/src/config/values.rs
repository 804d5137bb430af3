//! Scalar value parsers for configuration strings.

/// `1/on/true/yes` and `0/off/false/no`, case-insensitively.
pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// How a log file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    Append,
    #[default]
    Write,
}

impl LogMode {
    /// `a`/`append` or `w`/`overwrite`/`truncate`; empty means [`LogMode::Write`].
    pub fn parse(raw: &str) -> Option<LogMode> {
        match raw.to_lowercase().as_str() {
            "a" | "append" => Some(LogMode::Append),
            "" | "w" | "overwrite" | "truncate" => Some(LogMode::Write),
            _ => None,
        }
    }

    /// The `open(2)`-style mode letter.
    pub fn as_str(self) -> &'static str {
        match self {
            LogMode::Append => "a",
            LogMode::Write => "w",
        }
    }
}
