//! Fixed-layout formatter

use super::Formatter;
use crate::core::{LogEvent, TimestampFormat};

/// Renders `[timestamp] [LEVEL] [client] name - message | throwable`.
///
/// The client segment is omitted when the event carries no client id, the
/// throwable segment when there is no captured error.
#[derive(Debug, Clone)]
pub struct SimpleFormatter {
    timestamp_format: TimestampFormat,
}

impl SimpleFormatter {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::Iso8601,
        }
    }

    /// Set the timestamp format for this formatter
    ///
    /// # Examples
    ///
    /// ```
    /// use microlog::format::SimpleFormatter;
    /// use microlog::TimestampFormat;
    ///
    /// let formatter = SimpleFormatter::new()
    ///     .with_timestamp_format(TimestampFormat::UnixMillis);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for SimpleFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let timestamp_str = self.timestamp_format.format(&event.timestamp);

        let mut output = format!("[{}] [{:5}] ", timestamp_str, event.level);
        if !event.client_id.is_empty() {
            output.push('[');
            output.push_str(&event.client_id);
            output.push_str("] ");
        }
        output.push_str(&event.name);
        output.push_str(" - ");
        output.push_str(&event.message);

        if let Some(ref throwable) = event.throwable {
            output.push_str(" | ");
            output.push_str(&throwable.render(None));
        }

        output
    }

    fn name(&self) -> &str {
        "SimpleFormatter"
    }
}
