//! # microlog
//!
//! An embeddable, leveled logging core for client applications.
//!
//! ## Features
//!
//! - **Pattern formatting**: a `%`-directive mini-language compiled once into
//!   a command pipeline
//! - **Multiple Appenders**: console, rotating file, UDP datagram, and custom
//!   appenders through a factory registry
//! - **Thread Safe**: one shared root logger, reconfigurable at runtime
//! - **Best effort**: nothing in the logging path fails the caller
//!
//! ```
//! use microlog::prelude::*;
//!
//! let logger = Logger::builder()
//!     .level(LogLevel::Info)
//!     .appender(ConsoleAppender::new())
//!     .build();
//! logger.info("app.Main", "started");
//! ```

pub mod appenders;
pub mod config;
pub mod core;
pub mod format;
pub mod macros;
pub mod manager;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, DatagramAppender, FileAppender, RotationPolicy};
    pub use crate::config::{Configuration, FactoryRegistry};
    pub use crate::core::{
        Appender, LogEvent, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
        LoggerRepository, Result, SharedAppender, Throwable, TimestampFormat,
    };
    pub use crate::format::{Formatter, PatternFormatter, SimpleFormatter};
}

pub use appenders::{ConsoleAppender, DatagramAppender, FileAppender, RotationPolicy};
pub use config::{Configuration, FactoryRegistry};
pub use core::{
    Appender, LogEvent, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    LoggerRepository, Result, SharedAppender, Throwable, TimestampFormat,
};
pub use format::{Formatter, PatternFormatter, SimpleFormatter};
