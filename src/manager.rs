//! Application-facing facade over the global repository
//!
//! In verbose mode every call bypasses the pipeline and writes
//! `L/tag: message` straight to stderr; otherwise calls go to the root
//! logger of [`LoggerRepository::global`].
//!
//! ```
//! use microlog::manager;
//!
//! manager::set_verbose(true);
//! manager::debug("Startup", "verbose console output");
//! manager::set_verbose(false);
//! manager::info("Startup", "through the configured appenders");
//! ```

use crate::config::{Configuration, FactoryRegistry};
use crate::core::{LogLevel, Logger, LoggerRepository, Throwable};
use std::collections::HashMap;
use std::error::Error;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Configure the global root logger with the built-in factories.
pub fn configure(config: &Configuration) {
    configure_with(config, &FactoryRegistry::new());
}

pub fn configure_with(config: &Configuration, registry: &FactoryRegistry) {
    LoggerRepository::global().apply_configuration(config, registry);
}

/// Configure from a classic `microlog.*` property map.
pub fn configure_from_properties(properties: &HashMap<String, String>) {
    configure(&Configuration::from_properties(properties));
}

pub fn logger() -> &'static Logger {
    LoggerRepository::global().root_logger()
}

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn set_client_id(client_id: impl Into<String>) {
    logger().set_client_id(client_id);
}

pub fn log(level: LogLevel, tag: &str, message: impl Into<String>) {
    if is_verbose() {
        write_verbose(level, tag, &message.into());
    } else {
        logger().log(level, tag, message);
    }
}

pub fn log_error(level: LogLevel, tag: &str, error: &(dyn Error + 'static)) {
    if is_verbose() {
        write_verbose(level, tag, &Throwable::capture(error).render(None));
    } else {
        logger().log_error(level, tag, error);
    }
}

fn write_verbose(level: LogLevel, tag: &str, message: &str) {
    let _ = writeln!(std::io::stderr().lock(), "{}", verbose_line(level, tag, message));
}

pub(crate) fn verbose_line(level: LogLevel, tag: &str, message: &str) -> String {
    format!("{}/{}: {}", level.short_char(), tag, message)
}

pub fn trace(tag: &str, message: impl Into<String>) {
    log(LogLevel::Trace, tag, message);
}

pub fn debug(tag: &str, message: impl Into<String>) {
    log(LogLevel::Debug, tag, message);
}

pub fn info(tag: &str, message: impl Into<String>) {
    log(LogLevel::Info, tag, message);
}

pub fn warn(tag: &str, message: impl Into<String>) {
    log(LogLevel::Warn, tag, message);
}

pub fn error(tag: &str, message: impl Into<String>) {
    log(LogLevel::Error, tag, message);
}

pub fn fatal(tag: &str, message: impl Into<String>) {
    log(LogLevel::Fatal, tag, message);
}

pub fn trace_error(tag: &str, error: &(dyn Error + 'static)) {
    log_error(LogLevel::Trace, tag, error);
}

pub fn debug_error(tag: &str, error: &(dyn Error + 'static)) {
    log_error(LogLevel::Debug, tag, error);
}

pub fn info_error(tag: &str, error: &(dyn Error + 'static)) {
    log_error(LogLevel::Info, tag, error);
}

pub fn warn_error(tag: &str, error: &(dyn Error + 'static)) {
    log_error(LogLevel::Warn, tag, error);
}

pub fn error_error(tag: &str, error: &(dyn Error + 'static)) {
    log_error(LogLevel::Error, tag, error);
}

pub fn fatal_error(tag: &str, error: &(dyn Error + 'static)) {
    log_error(LogLevel::Fatal, tag, error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_line_layout() {
        assert_eq!(verbose_line(LogLevel::Error, "Net", "boom"), "E/Net: boom");
        assert_eq!(verbose_line(LogLevel::Trace, "Ui", "tick"), "V/Ui: tick");
    }
}
