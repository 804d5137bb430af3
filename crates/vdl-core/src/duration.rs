//! Sleep durations parsed from configuration text.
//!
//! A [`Duration`] is a non-negative number of seconds no larger than the
//! longest timed wait the platform supports. A [`TimeInterval`] is a pair of
//! them from which a random sleep is drawn.

use rand::Rng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest sleep accepted, in seconds (the platform's timed-wait ceiling).
#[cfg(windows)]
pub const MAX_SLEEP_SECS: f64 = 4_294_967.0;
#[cfg(not(windows))]
pub const MAX_SLEEP_SECS: f64 = 9_223_372_036.0;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid duration {text:?}: {reason}")]
pub struct InvalidDuration {
    pub text: String,
    pub reason: &'static str,
}

/// Seconds in `[0, MAX_SLEEP_SECS]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Duration(f64);

impl Duration {
    pub const ZERO: Duration = Duration(0.0);

    /// Parse a decimal real number of seconds. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, InvalidDuration> {
        let secs: f64 = text.trim().parse().map_err(|_| InvalidDuration {
            text: text.to_string(),
            reason: "not a decimal number",
        })?;
        Self::from_secs(secs).map_err(|err| InvalidDuration {
            text: text.to_string(),
            ..err
        })
    }

    pub fn from_secs(secs: f64) -> Result<Self, InvalidDuration> {
        if (0.0..=MAX_SLEEP_SECS).contains(&secs) {
            Ok(Duration(secs))
        } else {
            Err(InvalidDuration {
                text: secs.to_string(),
                reason: "negative or longer than the maximum sleep",
            })
        }
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    pub fn to_std(self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.0)
    }
}

impl FromStr for Duration {
    type Err = InvalidDuration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Duration::parse(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

/// Human-readable seconds: `"42.0s"` under a minute, otherwise `"2m5s"`.
///
/// Accepts any value (including negative elapsed-time deltas) since it is
/// only used for display.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{seconds:.1}s");
    }
    let total = seconds.round() as u64;
    format!("{}m{}s", total / 60, total % 60)
}

/// Closed interval of sleep durations; `lower > upper` is allowed and treated
/// as the same interval with the bounds swapped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeInterval {
    pub lower: Duration,
    pub upper: Duration,
}

impl TimeInterval {
    pub fn new(lower: Duration, upper: Duration) -> Self {
        Self { lower, upper }
    }

    /// Parse `"upper"` or `"lower,upper"`.
    ///
    /// The empty string is the zero interval. Fields after the second are
    /// ignored, but each of the first two must be a valid [`Duration`], so a
    /// trailing comma (`"3,"`) is an error rather than a single value.
    pub fn parse(text: &str) -> Result<Self, InvalidDuration> {
        if text.is_empty() {
            return Ok(Self::default());
        }
        let mut fields = text.split(',');
        let first = fields.next().unwrap_or_default();
        match fields.next() {
            None => Ok(Self::new(Duration::ZERO, Duration::parse(first)?)),
            Some(second) => Ok(Self::new(Duration::parse(first)?, Duration::parse(second)?)),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.lower.is_zero() && self.upper.is_zero()
    }

    /// `(min, max)` of the two bounds.
    pub fn ordered(&self) -> (Duration, Duration) {
        if self.lower <= self.upper {
            (self.lower, self.upper)
        } else {
            (self.upper, self.lower)
        }
    }

    pub fn random_duration(&self) -> Duration {
        self.random_duration_with(&mut rand::thread_rng())
    }

    /// Uniform draw from the closed interval.
    pub fn random_duration_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = self.ordered();
        if lo == hi {
            return lo;
        }
        Duration(rng.gen_range(lo.0..=hi.0))
    }
}
