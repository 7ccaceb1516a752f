//! Console appender implementation

use crate::core::{Appender, LogEvent, Result};
use crate::format::{Formatter, PatternFormatter};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

/// Standard stream the console appender writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleTarget {
    #[default]
    Stderr,
    Stdout,
}

/// Writes each formatted event as one line to stderr (or stdout).
///
/// Write failures are swallowed: the console is the sink of last resort.
pub struct ConsoleAppender {
    target: ConsoleTarget,
    use_colors: bool,
    formatter: Arc<dyn Formatter>,
    open: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            target: ConsoleTarget::default(),
            use_colors: cfg!(feature = "console"),
            formatter: Arc::new(PatternFormatter::default()),
            open: false,
        }
    }

    /// Color the whole line by level. Without the `console` feature this
    /// has no effect.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ConsoleTarget) -> Self {
        self.target = target;
        self
    }

    /// # Examples
    ///
    /// ```
    /// use microlog::appenders::ConsoleAppender;
    /// use microlog::format::PatternFormatter;
    /// use std::sync::Arc;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_formatter(Arc::new(PatternFormatter::new("%-5p %c{2}: %m")));
    /// ```
    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    #[cfg(feature = "console")]
    fn render(&self, event: &LogEvent) -> String {
        let line = self.formatter.format(event);
        if self.use_colors {
            line.color(event.level.color_code()).to_string()
        } else {
            line
        }
    }

    #[cfg(not(feature = "console"))]
    fn render(&self, event: &LogEvent) -> String {
        self.formatter.format(event)
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn do_log(&mut self, event: &LogEvent) -> Result<()> {
        let output = self.render(event);
        let _ = match self.target {
            ConsoleTarget::Stderr => writeln!(std::io::stderr().lock(), "{}", output),
            ConsoleTarget::Stdout => writeln!(std::io::stdout().lock(), "{}", output),
        };
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            let _ = match self.target {
                ConsoleTarget::Stderr => std::io::stderr().flush(),
                ConsoleTarget::Stdout => std::io::stdout().flush(),
            };
        }
        self.open = false;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn log_size(&self) -> Option<u64> {
        None
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn formatter(&self) -> &Arc<dyn Formatter> {
        &self.formatter
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.formatter = formatter;
    }

    fn name(&self) -> &str {
        "ConsoleAppender"
    }
}
