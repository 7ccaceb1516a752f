//! Appender trait for log output destinations

use super::{error::Result, log_event::LogEvent};
use crate::format::Formatter;
use parking_lot::Mutex;
use std::sync::Arc;

/// A log sink.
///
/// The logger wraps every appender in its own mutex ([`SharedAppender`]), so
/// `do_log` runs exclusively per appender and implementations need no
/// internal locking.
pub trait Appender: Send {
    /// Acquire resources. Called once before first use.
    fn open(&mut self) -> Result<()>;

    /// Format and write one event.
    fn do_log(&mut self, event: &LogEvent) -> Result<()>;

    /// Release resources. Safe to call repeatedly.
    fn close(&mut self) -> Result<()>;

    /// Discard logged content, where the sink supports it.
    fn clear(&mut self) -> Result<()>;

    /// Bytes logged so far, `None` when undefined for this sink.
    fn log_size(&self) -> Option<u64>;

    fn is_open(&self) -> bool;

    fn formatter(&self) -> &Arc<dyn Formatter>;

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>);

    fn name(&self) -> &str;
}

/// An appender behind its per-appender lock.
pub type SharedAppender = Arc<Mutex<Box<dyn Appender>>>;

pub fn shared<A: Appender + 'static>(appender: A) -> SharedAppender {
    Arc::new(Mutex::new(Box::new(appender)))
}
