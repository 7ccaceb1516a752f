//! Event formatters
//!
//! A [`Formatter`] renders a [`LogEvent`] to one line of text. Formatters are
//! immutable once built and are shared between appenders through `Arc`.

pub mod command;
pub mod pattern;
pub mod simple;

use crate::core::LogEvent;
use std::fmt;

pub use command::{extract_partial_name, CategoryCommand, FormatCommand};
pub use pattern::{Padding, PatternFormatter, PatternToken, DEFAULT_PATTERN};
pub use simple::SimpleFormatter;

pub trait Formatter: Send + Sync + fmt::Debug {
    fn format(&self, event: &LogEvent) -> String;

    fn name(&self) -> &str;
}
