//! Name → constructor registry for appenders and formatters

use super::Configuration;
use crate::appenders::{ConsoleAppender, DatagramAppender, FileAppender};
use crate::core::{Appender, LoggerError, Result};
use crate::format::{Formatter, PatternFormatter, SimpleFormatter};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type AppenderFactory =
    Arc<dyn Fn(&Configuration) -> Result<Box<dyn Appender>> + Send + Sync>;
pub type FormatterFactory =
    Arc<dyn Fn(&Configuration) -> Result<Arc<dyn Formatter>> + Send + Sync>;

/// Maps configuration names to constructors.
///
/// [`FactoryRegistry::new`] knows the built-in appenders and formatters under
/// their full and short names (`ConsoleAppender`/`Console`/`LogCatAppender`,
/// `FileAppender`/`File`, `DatagramAppender`/`Datagram`,
/// `PatternFormatter`/`Pattern`, `SimpleFormatter`/`Simple`). Applications
/// register their own sinks the same way.
///
/// # Examples
///
/// ```
/// use microlog::appenders::ConsoleAppender;
/// use microlog::config::{Configuration, FactoryRegistry};
/// use microlog::core::Appender;
///
/// let mut registry = FactoryRegistry::new();
/// registry.register_appender("Stdout", |_config| {
///     let appender: Box<dyn Appender> = Box::new(ConsoleAppender::new());
///     Ok(appender)
/// });
/// assert!(registry.create_appender("Stdout", &Configuration::new()).is_ok());
/// ```
#[derive(Clone)]
pub struct FactoryRegistry {
    appenders: HashMap<String, AppenderFactory>,
    formatters: HashMap<String, FormatterFactory>,
}

impl FactoryRegistry {
    /// Registry with the built-in appenders and formatters.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        let console: AppenderFactory = Arc::new(|_config: &Configuration| {
            Ok(Box::new(ConsoleAppender::new()) as Box<dyn Appender>)
        });
        let file: AppenderFactory = Arc::new(|config: &Configuration| {
            let appender = FileAppender::new(config.file_path()).with_wrap(&config.file_wrap);
            Ok(Box::new(appender) as Box<dyn Appender>)
        });
        let datagram: AppenderFactory = Arc::new(|config: &Configuration| {
            let appender = DatagramAppender::new(&config.datagram_host, config.datagram_port);
            Ok(Box::new(appender) as Box<dyn Appender>)
        });

        for name in ["ConsoleAppender", "Console", "LogCatAppender", "LogCat"] {
            registry.appenders.insert(name.to_string(), Arc::clone(&console));
        }
        for name in ["FileAppender", "File"] {
            registry.appenders.insert(name.to_string(), Arc::clone(&file));
        }
        for name in ["DatagramAppender", "Datagram"] {
            registry.appenders.insert(name.to_string(), Arc::clone(&datagram));
        }

        let pattern: FormatterFactory = Arc::new(|config: &Configuration| {
            Ok(Arc::new(PatternFormatter::new(config.pattern.as_str())) as Arc<dyn Formatter>)
        });
        let simple: FormatterFactory = Arc::new(|_config: &Configuration| {
            Ok(Arc::new(SimpleFormatter::new()) as Arc<dyn Formatter>)
        });
        for name in ["PatternFormatter", "Pattern"] {
            registry.formatters.insert(name.to_string(), Arc::clone(&pattern));
        }
        for name in ["SimpleFormatter", "Simple"] {
            registry.formatters.insert(name.to_string(), Arc::clone(&simple));
        }

        registry
    }

    /// Registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            appenders: HashMap::new(),
            formatters: HashMap::new(),
        }
    }

    /// Register (or replace) the appender constructor for `name`.
    pub fn register_appender<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Configuration) -> Result<Box<dyn Appender>> + Send + Sync + 'static,
    {
        self.appenders.insert(name.into(), Arc::new(factory));
    }

    pub fn register_formatter<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Configuration) -> Result<Arc<dyn Formatter>> + Send + Sync + 'static,
    {
        self.formatters.insert(name.into(), Arc::new(factory));
    }

    pub fn create_appender(&self, name: &str, config: &Configuration) -> Result<Box<dyn Appender>> {
        let factory = self.appenders.get(name.trim()).ok_or_else(|| {
            LoggerError::config("FactoryRegistry", format!("unknown appender '{}'", name))
        })?;
        factory(config)
    }

    pub fn create_formatter(&self, name: &str, config: &Configuration) -> Result<Arc<dyn Formatter>> {
        let factory = self.formatters.get(name.trim()).ok_or_else(|| {
            LoggerError::config("FactoryRegistry", format!("unknown formatter '{}'", name))
        })?;
        factory(config)
    }

    pub fn has_appender(&self, name: &str) -> bool {
        self.appenders.contains_key(name)
    }

    pub fn has_formatter(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Registered appender names, sorted.
    pub fn appender_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.appenders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn formatter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("appenders", &self.appender_names())
            .field("formatters", &self.formatter_names())
            .finish()
    }
}
