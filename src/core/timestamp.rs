//! Timestamp formatting utilities
//!
//! Date layouts are written in the letter syntax used by the configuration
//! format (`yyyy-MM-dd HH:mm:ss,SSS`) and compiled once into a strftime
//! string that `chrono` renders.

use chrono::{DateTime, Utc};

/// Default date layout for date-stamped log file names.
pub const FILE_STAMP_PATTERN: &str = "yyyyMMddHHmmss";

/// Timestamp layout used by `%d` and the simple formatter
///
/// # Examples
///
/// ```
/// use microlog::core::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// let format = TimestampFormat::from_specifier("yyyy/MM/dd");
/// assert_eq!(format.format(&at), "2025/01/08");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `HH:mm:ss,SSS`
    #[default]
    Absolute,

    /// `dd MMM yyyy HH:mm:ss,SSS`
    Date,

    /// `yyyy-MM-dd HH:mm:ss,SSS`
    Iso8601,

    /// Milliseconds since the Unix epoch
    UnixMillis,

    /// Compiled strftime string
    Custom(String),
}

impl TimestampFormat {
    /// Resolve a `%d{...}` specifier: a named layout or a letter pattern.
    pub fn from_specifier(spec: &str) -> Self {
        match spec.trim() {
            "" | "ABSOLUTE" => TimestampFormat::Absolute,
            "DATE" => TimestampFormat::Date,
            "ISO8601" => TimestampFormat::Iso8601,
            "UNIX" | "UNIX_MILLIS" => TimestampFormat::UnixMillis,
            pattern => TimestampFormat::Custom(compile_date_pattern(pattern)),
        }
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Absolute => datetime.format("%H:%M:%S,%3f").to_string(),
            TimestampFormat::Date => datetime.format("%d %b %Y %H:%M:%S,%3f").to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%d %H:%M:%S,%3f").to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(strftime) => datetime.format(strftime).to_string(),
        }
    }
}

/// Compile a letter date pattern into a strftime string.
///
/// Letters without a mapping are kept as literal text; text inside single
/// quotes is literal and `''` is a quote.
pub fn compile_date_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        i += run;

        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('S', _) => "%3f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('Z', _) => "%z",
            ('z', _) => "%Z",
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
                continue;
            }
        };
        out.push_str(spec);
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
