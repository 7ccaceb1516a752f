//! Logging macros for ergonomic log message formatting.
//!
//! Every macro takes the logger, the tag (logger name) and then `format!`
//! arguments. Formatting happens only when the level is enabled.
//!
//! # Examples
//!
//! ```
//! use microlog::prelude::*;
//! use microlog::info;
//!
//! let logger = Logger::new();
//!
//! info!(logger, "net.Server", "Server started");
//!
//! let port = 8080;
//! info!(logger, "net.Server", "Server listening on port {}", port);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use microlog::prelude::*;
/// # let logger = Logger::new();
/// use microlog::log;
/// log!(logger, LogLevel::Info, "app", "Simple message");
/// log!(logger, LogLevel::Error, "app", "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $tag:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            $logger.log(level, $tag, format!($($arg)+));
        }
    }};
}

/// Log a trace-level message.
///
/// ```
/// # use microlog::prelude::*;
/// # let logger = Logger::new();
/// # logger.set_level(LogLevel::Trace);
/// use microlog::trace;
/// trace!(logger, "calc", "Entering function: calculate()");
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $tag, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $tag, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $tag, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use microlog::prelude::*;
/// # let logger = Logger::new();
/// use microlog::warn;
/// warn!(logger, "net", "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $tag, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $tag, $($arg)+)
    };
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $tag, $($arg)+)
    };
}
