//! Basic logger usage example
//!
//! Demonstrates a console logger, level filtering, pattern layouts and the
//! manager facade.
//!
//! Run with: cargo run --example basic_usage

use microlog::prelude::*;
use microlog::{info, manager, warn};
use std::sync::Arc;

fn main() {
    println!("=== microlog - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .level(LogLevel::Trace)
        .appender(
            ConsoleAppender::new()
                .with_formatter(Arc::new(PatternFormatter::new("%d %-5p %c{1} - %m"))),
        )
        .build();

    println!("1. Logging at different levels:");
    logger.trace("demo.Levels", "This is a trace message");
    logger.debug("demo.Levels", "This is a debug message");
    logger.info("demo.Levels", "This is an info message");
    logger.warn("demo.Levels", "This is a warning message");
    logger.error("demo.Levels", "This is an error message");
    logger.fatal("demo.Levels", "This is a fatal message");

    println!("\n2. Logging with a higher threshold:");
    logger.set_level(LogLevel::Info);
    logger.debug("demo.Levels", "Debug message (hidden)");
    info!(logger, "demo.Levels", "Info message {} (visible)", 1);
    warn!(logger, "demo.Levels", "Warning message {} (visible)", 2);

    println!("\n3. Logging an error chain:");
    let error = std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml missing");
    logger.log_with_error(LogLevel::Error, "demo.Config", "Falling back to defaults", &error);

    println!("\n4. Manager facade:");
    manager::configure(
        &Configuration::new()
            .with_level(LogLevel::Debug)
            .with_pattern("%r [%P] %c: %m")
            .with_client_id("demo"),
    );
    manager::info("demo.Manager", "Configured through the global repository");

    manager::set_verbose(true);
    manager::debug("demo.Manager", "Verbose mode writes straight to stderr");
    manager::set_verbose(false);

    println!("\n=== Example completed successfully! ===");
}
