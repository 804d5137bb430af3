//! `%(name)s`-style record templates, the format users write in `LogFmt` and
//! `MasterLogFmt`.

use chrono::{DateTime, Local};
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

use super::DEFAULT_DATEFMT;

/// Value substituted for `%(module)s`.
const MODULE: &str = "video_dl";

/// Event formatter driven by a record template.
///
/// Supported placeholders: `asctime`, `created`, `levelname`, `levelno`,
/// `message`, `module`, `name`, `process`, each with optional `-` and width
/// (`%(levelname)-8s`). `%%` is a literal percent sign. Fields of enclosing
/// spans are prepended to the message as `value: `.
#[derive(Debug, Clone)]
pub struct LogTemplate {
    name: String,
    fmt: String,
    datefmt: String,
}

impl LogTemplate {
    pub fn new(name: &str, fmt: &str, datefmt: &str) -> Self {
        Self {
            name: name.to_string(),
            fmt: fmt.to_string(),
            datefmt: datefmt.to_string(),
        }
    }

    pub fn render(&self, level: Level, message: &str, now: DateTime<Local>) -> String {
        let mut out = String::with_capacity(self.fmt.len() + message.len());
        let mut rest = self.fmt.as_str();
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            rest = &rest[pos + 1..];
            if let Some(after) = rest.strip_prefix('%') {
                out.push('%');
                rest = after;
                continue;
            }
            match self.placeholder(rest, level, message, now) {
                Some((value, consumed)) => {
                    out.push_str(&value);
                    rest = &rest[consumed..];
                }
                None => out.push('%'),
            }
        }
        out.push_str(rest);
        out
    }

    /// Expand `(key)<flags><width><conv>` at the start of `spec`; returns the
    /// text and how many bytes of `spec` it used.
    fn placeholder(
        &self,
        spec: &str,
        level: Level,
        message: &str,
        now: DateTime<Local>,
    ) -> Option<(String, usize)> {
        let body = spec.strip_prefix('(')?;
        let close = body.find(')')?;
        let key = &body[..close];
        let tail = &body[close + 1..];
        let conv_at = tail.find(|c: char| !matches!(c, '-' | '+' | ' ' | '#' | '.' | '0'..='9'))?;
        if !tail[conv_at..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let flags = &tail[..conv_at];
        let value = match key {
            "asctime" => self.asctime(now),
            "created" => format!("{:.6}", now.timestamp_micros() as f64 / 1e6),
            "levelname" => level_name(level).to_string(),
            "levelno" => level_number(level).to_string(),
            "message" => message.to_string(),
            "module" => MODULE.to_string(),
            "name" => self.name.clone(),
            "process" => std::process::id().to_string(),
            _ => return None,
        };
        // '(' + key + ')' + flags + conversion letter
        let consumed = 1 + close + 1 + conv_at + 1;
        Some((pad(value, flags), consumed))
    }

    fn asctime(&self, now: DateTime<Local>) -> String {
        let mut out = String::new();
        if write!(out, "{}", now.format(&self.datefmt)).is_err() {
            out.clear();
            let _ = write!(out, "{}", now.format(DEFAULT_DATEFMT));
        }
        out
    }
}

fn pad(value: String, flags: &str) -> String {
    let left = flags.contains('-');
    let width: usize = flags
        .trim_start_matches(['-', '+', ' ', '#', '0'])
        .split('.')
        .next()
        .and_then(|w| w.parse().ok())
        .unwrap_or(0);
    if left {
        format!("{value:<width$}")
    } else {
        format!("{value:>width$}")
    }
}

pub fn level_name(level: Level) -> &'static str {
    if level == Level::ERROR {
        "ERROR"
    } else if level == Level::WARN {
        "WARNING"
    } else if level == Level::INFO {
        "INFO"
    } else if level == Level::DEBUG {
        "DEBUG"
    } else {
        "TRACE"
    }
}

pub fn level_number(level: Level) -> i32 {
    if level == Level::ERROR {
        40
    } else if level == Level::WARN {
        30
    } else if level == Level::INFO {
        20
    } else if level == Level::DEBUG {
        10
    } else {
        5
    }
}

impl<S, N> FormatEvent<S, N> for LogTemplate
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        message.push_str(fields);
                        message.push_str(": ");
                    }
                }
            }
        }
        let mut record = RecordVisitor::default();
        event.record(&mut record);
        message.push_str(&record.message);
        message.push_str(&record.fields);
        writeln!(
            writer,
            "{}",
            self.render(*event.metadata().level(), &message, Local::now())
        )
    }
}

/// Span field formatter that writes bare values, so a span created with
/// `section = %name` contributes just `name`.
pub(crate) fn write_bare(
    writer: &mut Writer<'_>,
    _field: &Field,
    value: &dyn fmt::Debug,
) -> fmt::Result {
    write!(writer, "{value:?}")
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: String,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
