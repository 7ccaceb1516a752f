//! Process-wide home of the root logger

use super::logger::{Logger, LoggerSettings};
use crate::config::{self, Configuration, FactoryRegistry};
use std::sync::OnceLock;

static GLOBAL: OnceLock<LoggerRepository> = OnceLock::new();

/// Owns the single root [`Logger`].
///
/// [`LoggerRepository::global`] is created on first use and lives for the
/// rest of the process; it is reconfigured in place, never replaced.
pub struct LoggerRepository {
    root: Logger,
}

impl LoggerRepository {
    /// A standalone repository, independent of the global one.
    pub fn new() -> Self {
        Self {
            root: Logger::new(),
        }
    }

    pub fn global() -> &'static LoggerRepository {
        GLOBAL.get_or_init(LoggerRepository::new)
    }

    pub fn root_logger(&self) -> &Logger {
        &self.root
    }

    /// Rebuild the root logger from `config`. Callers already logging see
    /// either the old or the new setup, and the old appenders are closed
    /// once the new ones are in place.
    pub fn apply_configuration(&self, config: &Configuration, registry: &FactoryRegistry) {
        self.root.reconfigure(config::resolve(config, registry));
    }

    /// Back to the freshly constructed state: no appenders (previous ones
    /// closed), default level, default fallback, no client id, zeroed
    /// metrics.
    pub fn reset(&self) {
        self.root.reconfigure(LoggerSettings {
            level: None,
            appenders: Vec::new(),
            add_default_logger: true,
            client_id: String::new(),
        });
        self.root.metrics().reset();
    }
}

impl Default for LoggerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logger::test_support::RecordingAppender;
    use crate::core::{Appender, LogLevel};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_global_is_a_singleton() {
        let a = LoggerRepository::global() as *const LoggerRepository;
        let b = LoggerRepository::global() as *const LoggerRepository;
        assert_eq!(a, b);
    }

    #[test]
    fn test_apply_configuration_replaces_everything() {
        let repository = LoggerRepository::new();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let previous = repository
            .root_logger()
            .add_appender(Box::new(RecordingAppender::new("old", Arc::clone(&lines))));
        repository.root_logger().info("t", "opens the old appender");

        let mut registry = FactoryRegistry::new();
        let captured = Arc::clone(&lines);
        registry.register_appender("Memory", move |_config| {
            let appender: Box<dyn Appender> =
                Box::new(RecordingAppender::new("mem", Arc::clone(&captured)));
            Ok(appender)
        });

        let config = Configuration::new()
            .with_level(LogLevel::Error)
            .with_appenders(["Memory"])
            .with_pattern("%m")
            .with_client_id("id-1");
        repository.apply_configuration(&config, &registry);

        let root = repository.root_logger();
        root.warn("t", "filtered");
        root.error("t", "kept");

        assert!(!previous.lock().is_open());
        assert_eq!(root.appender_count(), 1);
        assert_eq!(root.level(), LogLevel::Error);
        assert_eq!(root.client_id(), "id-1");
        assert_eq!(
            *lines.lock(),
            vec!["old:INFO t opens the old appender", "mem:kept"]
        );
    }

    #[test]
    fn test_reset_restores_pristine_state() {
        let repository = LoggerRepository::new();
        let root = repository.root_logger();
        root.set_level(LogLevel::Fatal);
        root.set_client_id("x");
        root.set_add_default_logger(false);
        let lines = Arc::new(Mutex::new(Vec::new()));
        root.add_appender(Box::new(RecordingAppender::new("a", lines)));
        root.debug("t", "filtered");

        repository.reset();

        assert_eq!(root.explicit_level(), None);
        assert_eq!(root.appender_count(), 0);
        assert!(root.add_default_logger());
        assert!(root.client_id().is_empty());
        assert_eq!(root.metrics().filtered_count(), 0);
    }
}
