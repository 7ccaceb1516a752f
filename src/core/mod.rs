//! Core logger types and traits

pub mod appender;
pub mod diagnostics;
pub mod error;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod repository;
pub mod timestamp;

pub use appender::{shared, Appender, SharedAppender};
pub use error::{LoggerError, Result};
pub use log_event::{LogEvent, Throwable};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerSettings, DEFAULT_LEVEL};
pub use metrics::LoggerMetrics;
pub use repository::LoggerRepository;
pub use timestamp::TimestampFormat;
