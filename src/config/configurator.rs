//! Turns a [`Configuration`] into the settings of the root logger

use super::{Configuration, FactoryRegistry};
use crate::appenders::ConsoleAppender;
use crate::core::appender::{shared, SharedAppender};
use crate::core::diagnostics;
use crate::core::logger::LoggerSettings;
use crate::format::{Formatter, PatternFormatter};
use std::sync::Arc;

/// Build the formatter and appender chain described by `config`.
///
/// An unknown or failing formatter falls back to the default pattern
/// formatter; unknown or failing appenders are skipped, and if none of the
/// requested appenders could be built a console appender takes their place.
/// Every problem is reported as a warning. One formatter instance is shared
/// by all appenders.
pub fn resolve(config: &Configuration, registry: &FactoryRegistry) -> LoggerSettings {
    let formatter: Arc<dyn Formatter> = registry
        .create_formatter(&config.formatter, config)
        .unwrap_or_else(|e| {
            diagnostics::warn(
                "Configurator",
                format!("{}; using the default pattern formatter", e),
            );
            Arc::new(PatternFormatter::default())
        });

    let mut appenders: Vec<SharedAppender> = Vec::with_capacity(config.appenders.len());
    for name in &config.appenders {
        match registry.create_appender(name, config) {
            Ok(mut appender) => {
                appender.set_formatter(Arc::clone(&formatter));
                appenders.push(Arc::new(parking_lot::Mutex::new(appender)));
            }
            Err(e) => diagnostics::warn("Configurator", format!("skipping appender: {}", e)),
        }
    }

    if appenders.is_empty() && !config.appenders.is_empty() {
        diagnostics::warn(
            "Configurator",
            "no configured appender could be created; falling back to console",
        );
        appenders.push(shared(
            ConsoleAppender::new().with_formatter(Arc::clone(&formatter)),
        ));
    }

    LoggerSettings {
        level: config.level,
        appenders,
        add_default_logger: config.add_default_logger,
        client_id: config.client_id.clone(),
    }
}
