//! Publish-date filter handed to the download engine.
//!
//! Bounds are absolute (`YYYYMMDD`) or relative to today in UTC
//! (`today-6days`, `now+1week`, `yesterday`). Both ends are inclusive.

use chrono::{Days, Months, NaiveDate, Utc};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date {text:?}: {reason}")]
pub struct DateRangeError {
    pub text: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: earliest(),
            end: latest(),
        }
    }
}

fn earliest() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn latest() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

impl DateRange {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Result<Self, DateRangeError> {
        Self::relative_to(start, end, today())
    }

    /// Like [`DateRange::new`], resolving relative bounds against `today`.
    pub fn relative_to(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, DateRangeError> {
        let default = Self::default();
        Ok(Self {
            start: start.map_or(Ok(default.start), |s| date_from_str(s, today))?,
            end: end.map_or(Ok(default.end), |s| date_from_str(s, today))?,
        })
    }

    /// Build from configuration values, replacing an invalid bound with its
    /// default after a warning naming `start_key` or `end_key`.
    pub fn from_config(
        start: Option<&str>,
        end: Option<&str>,
        start_key: &str,
        end_key: &str,
    ) -> Self {
        let today = today();
        let default = Self::default();
        let bound = |value: Option<&str>, key: &str, fallback: NaiveDate| match value {
            None | Some("") => fallback,
            Some(text) => date_from_str(text, today).unwrap_or_else(|err| {
                tracing::warn!("invalid date for {}: {} ({})", key, text, err);
                fallback
            }),
        };
        Self {
            start: bound(start, start_key, default.start),
            end: bound(end, end_key, default.end),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DateRange(start='{}', end='{}')",
            format_date(self.start),
            format_date(self.end)
        )
    }
}

/// `YYYYMMDD`, zero-padded so that year 1 is `00010101`.
pub fn format_date(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn relative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(now|today|yesterday|date)([+-])(\d+)(day|week|month|year)s?$")
            .expect("relative date pattern is valid")
    })
}

/// Parse one bound: `YYYYMMDD`, `now`/`today`/`yesterday`, or
/// `(now|today|yesterday|date)[+-]N(day|week|month|year)[s]`.
pub fn date_from_str(text: &str, today: NaiveDate) -> Result<NaiveDate, DateRangeError> {
    let err = |reason| DateRangeError {
        text: text.to_string(),
        reason,
    };
    let text_lc = text.trim().to_lowercase();
    let base = |word: &str| match word {
        "yesterday" => today.checked_sub_days(Days::new(1)),
        _ => Some(today),
    };
    match text_lc.as_str() {
        "now" | "today" | "date" => return Ok(today),
        "yesterday" => return base("yesterday").ok_or_else(|| err("out of range")),
        _ => {}
    }

    if let Some(caps) = relative_re().captures(&text_lc) {
        let start = base(&caps[1]).ok_or_else(|| err("out of range"))?;
        let amount: u32 = caps[3].parse().map_err(|_| err("offset too large"))?;
        let forward = &caps[2] == "+";
        let shifted = match &caps[4] {
            "day" => shift_days(start, u64::from(amount), forward),
            "week" => shift_days(start, u64::from(amount) * 7, forward),
            "month" => shift_months(start, amount, forward),
            _ => amount
                .checked_mul(12)
                .and_then(|months| shift_months(start, months, forward)),
        };
        return shifted.ok_or_else(|| err("out of range"));
    }

    let digits = text_lc.as_bytes();
    if digits.len() != 8 || !digits.iter().all(u8::is_ascii_digit) {
        return Err(err("expected YYYYMMDD or a relative date like today-7days"));
    }
    let year: i32 = text_lc[..4].parse().map_err(|_| err("bad year"))?;
    let month: u32 = text_lc[4..6].parse().map_err(|_| err("bad month"))?;
    let day: u32 = text_lc[6..].parse().map_err(|_| err("bad day"))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| err("no such calendar date"))
}

fn shift_days(date: NaiveDate, days: u64, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, months: u32, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_months(Months::new(months))
    } else {
        date.checked_sub_months(Months::new(months))
    }
}
