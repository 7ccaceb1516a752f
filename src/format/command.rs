//! Pattern directives
//!
//! Each [`FormatCommand`] is built once from its directive character and
//! optional `{...}` specifier, then renders one fragment per event without
//! side effects.

use crate::core::diagnostics;
use crate::core::log_event::start_time;
use crate::core::{LogEvent, TimestampFormat};

/// `%c`: the logger name truncated to its last N dot-separated segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCommand {
    precision: i32,
}

impl CategoryCommand {
    /// Precision meaning "the whole name".
    pub const FULL_NAME: i32 = -1;
    pub const DEFAULT_PRECISION: i32 = 1;

    pub fn new(precision: i32) -> Self {
        Self { precision }
    }

    /// Parse the specifier; a missing or non-numeric one keeps the default.
    pub fn init(specifier: Option<&str>) -> Self {
        let precision = match specifier.map(str::trim) {
            None | Some("") => Self::DEFAULT_PRECISION,
            Some(spec) => spec.parse().unwrap_or_else(|_| {
                diagnostics::warn(
                    "PatternFormatter",
                    format!("ignoring non-numeric %c specifier '{}'", spec),
                );
                Self::DEFAULT_PRECISION
            }),
        };
        Self { precision }
    }

    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn execute(&self, event: &LogEvent) -> String {
        // Negative precisions, FULL_NAME included, keep the whole name.
        match usize::try_from(self.precision) {
            Ok(parts) => extract_partial_name(&event.name, parts).to_string(),
            Err(_) => event.name.clone(),
        }
    }
}

impl Default for CategoryCommand {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PRECISION)
    }
}

/// The last `parts` dot-separated segments of `name`.
///
/// Zero, or more parts than the name has, yields the whole name.
pub fn extract_partial_name(name: &str, parts: usize) -> &str {
    if parts == 0 {
        return name;
    }
    match name.rmatch_indices('.').nth(parts - 1) {
        Some((idx, _)) => &name[idx + 1..],
        None => name,
    }
}

fn parse_limit(directive: char, specifier: Option<&str>) -> Option<usize> {
    let spec = specifier.map(str::trim).filter(|s| !s.is_empty())?;
    match spec.parse() {
        Ok(limit) => Some(limit),
        Err(_) => {
            diagnostics::warn(
                "PatternFormatter",
                format!("ignoring non-numeric %{} specifier '{}'", directive, spec),
            );
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    /// `%c{N}`
    Category(CategoryCommand),
    /// `%p` / `%P`
    Priority,
    /// `%m{N}`, truncated to N characters
    Message { max_chars: Option<usize> },
    /// `%d{layout}`
    Date(TimestampFormat),
    /// `%r`, milliseconds since the logging core started
    RelativeTime,
    /// `%t`
    Thread,
    /// `%T{N}`, keeping at most N causes
    Throwable { depth: Option<usize> },
    /// `%i`
    ClientId,
}

impl FormatCommand {
    /// Build the command for `directive`, or `None` if it is not recognized.
    pub fn init(directive: char, specifier: Option<&str>) -> Option<Self> {
        let command = match directive {
            'c' => FormatCommand::Category(CategoryCommand::init(specifier)),
            'p' | 'P' => FormatCommand::Priority,
            'm' => FormatCommand::Message {
                max_chars: parse_limit(directive, specifier),
            },
            'd' => FormatCommand::Date(TimestampFormat::from_specifier(specifier.unwrap_or(""))),
            'r' => FormatCommand::RelativeTime,
            't' => FormatCommand::Thread,
            'T' => FormatCommand::Throwable {
                depth: parse_limit(directive, specifier),
            },
            'i' => FormatCommand::ClientId,
            _ => return None,
        };
        Some(command)
    }

    pub fn execute(&self, event: &LogEvent) -> String {
        match self {
            FormatCommand::Category(category) => category.execute(event),
            FormatCommand::Priority => event.level.to_str().to_string(),
            FormatCommand::Message { max_chars: None } => event.message.clone(),
            FormatCommand::Message {
                max_chars: Some(limit),
            } => event.message.chars().take(*limit).collect(),
            FormatCommand::Date(format) => format.format(&event.timestamp),
            FormatCommand::RelativeTime => (event.timestamp - start_time())
                .num_milliseconds()
                .to_string(),
            FormatCommand::Thread => event.thread().to_string(),
            FormatCommand::Throwable { depth } => event
                .throwable
                .as_ref()
                .map(|t| t.render(*depth))
                .unwrap_or_default(),
            FormatCommand::ClientId => event.client_id.clone(),
        }
    }
}
