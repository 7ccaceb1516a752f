//! File logging example
//!
//! Demonstrates a console and a rotating file appender side by side, driven
//! by a classic property map.
//!
//! Run with: cargo run --example file_logging

use microlog::manager;
use std::collections::HashMap;

fn main() {
    println!("=== microlog - File Logging Example ===\n");

    let properties: HashMap<String, String> = [
        ("microlog.level", "DEBUG"),
        ("microlog.appender", "ConsoleAppender;FileAppender"),
        ("microlog.formatter", "PatternFormatter"),
        ("microlog.formatter.PatternFormatter.pattern", "%d{ISO8601} [%P] %c{2}: %m %T"),
        ("microlog.appender.FileAppender.File", "application.log"),
        // rotate past 64 KiB, keep appending across runs
        ("microlog.appender.FileAppender.Options", "%s-0.0625 %a"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    manager::configure_from_properties(&properties);

    println!("1. Logging to both console and file:");
    manager::info("app.Main", "Application started");
    manager::debug("app.Config", "Loading configuration...");
    manager::warn("app.Config", "Using default settings for some options");
    manager::error_error(
        "app.Plugins",
        &std::io::Error::new(std::io::ErrorKind::NotFound, "optional plugin not installed"),
    );

    println!("\n2. Performing some operations:");
    for i in 1..=500 {
        manager::info("app.Worker", format!("Processing item {}/500", i));
    }
    manager::info("app.Main", "All operations completed");

    // closes the file appender
    microlog::LoggerRepository::global().reset();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' (and application.N.log backups) for the output");
}
