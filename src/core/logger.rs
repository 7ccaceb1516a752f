//! Main logger implementation

use super::{
    appender::{shared, Appender, SharedAppender},
    diagnostics,
    log_event::{LogEvent, Throwable},
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use crate::appenders::ConsoleAppender;
use parking_lot::RwLock;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Level used when none has been set explicitly.
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Debug;

/// An appender in the dispatch chain plus its own failure counter, so
/// diagnostics are throttled per appender.
#[derive(Clone)]
struct AppenderSlot {
    appender: SharedAppender,
    failures: Arc<AtomicU64>,
}

impl AppenderSlot {
    fn new(appender: SharedAppender) -> Self {
        Self {
            appender,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }
}

type AppenderChain = Arc<Vec<AppenderSlot>>;

struct LoggerState {
    level: Option<LogLevel>,
    appenders: AppenderChain,
    add_default_logger: bool,
    client_id: String,
}

impl LoggerState {
    fn effective_level(&self) -> LogLevel {
        self.level.unwrap_or(DEFAULT_LEVEL)
    }

    fn accepts(&self, level: LogLevel) -> bool {
        let threshold = self.effective_level();
        level != LogLevel::Off && threshold != LogLevel::Off && level >= threshold
    }
}

/// The replacement state handed to [`Logger::reconfigure`].
pub struct LoggerSettings {
    pub level: Option<LogLevel>,
    pub appenders: Vec<SharedAppender>,
    pub add_default_logger: bool,
    pub client_id: String,
}

/// Routes events to an ordered chain of appenders.
///
/// All methods take `&self`; the logger is meant to be shared between
/// threads. Dispatch runs on the calling thread under the read side of the
/// configuration lock, and each appender serializes its own writes behind
/// its mutex. Reconfiguration takes the write side, so it waits for
/// in-flight events and closes the replaced appenders before any new event
/// is dispatched: a call sees either the old or the new configuration as a
/// whole, and an old and a new appender never write at the same time.
///
/// Appenders must not log through the logger that owns them.
///
/// # Examples
///
/// ```
/// use microlog::appenders::ConsoleAppender;
/// use microlog::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Info)
///     .appender(ConsoleAppender::new())
///     .build();
///
/// logger.info("net.Client", "connected");
/// logger.debug("net.Client", "filtered out");
/// assert_eq!(logger.metrics().filtered_count(), 1);
/// ```
pub struct Logger {
    state: RwLock<LoggerState>,
    default_chain: AppenderChain,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LoggerState {
                level: None,
                appenders: Arc::new(Vec::new()),
                add_default_logger: true,
                client_id: String::new(),
            }),
            default_chain: Arc::new(vec![AppenderSlot::new(shared(ConsoleAppender::new()))]),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.state.write().level = Some(level);
    }

    /// The explicit level, or [`DEFAULT_LEVEL`] when none was set.
    pub fn level(&self) -> LogLevel {
        self.state.read().effective_level()
    }

    pub fn explicit_level(&self) -> Option<LogLevel> {
        self.state.read().level
    }

    /// Whether an event at `level` would be dispatched.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.state.read().accepts(level)
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) -> SharedAppender {
        let appender: SharedAppender = Arc::new(parking_lot::Mutex::new(appender));
        self.add_shared_appender(Arc::clone(&appender));
        appender
    }

    /// Append an appender the caller keeps a handle to.
    pub fn add_shared_appender(&self, appender: SharedAppender) {
        let mut state = self.state.write();
        let mut chain = Vec::with_capacity(state.appenders.len() + 1);
        chain.extend(state.appenders.iter().cloned());
        chain.push(AppenderSlot::new(appender));
        state.appenders = Arc::new(chain);
    }

    pub fn appender(&self, index: usize) -> Option<SharedAppender> {
        self.state
            .read()
            .appenders
            .get(index)
            .map(|slot| Arc::clone(&slot.appender))
    }

    pub fn appender_count(&self) -> usize {
        self.state.read().appenders.len()
    }

    /// Detach every appender and close it.
    pub fn remove_all_appenders(&self) {
        let mut state = self.state.write();
        let removed = std::mem::take(&mut state.appenders);
        close_chain(&removed);
    }

    pub fn set_add_default_logger(&self, add_default_logger: bool) {
        self.state.write().add_default_logger = add_default_logger;
    }

    pub fn add_default_logger(&self) -> bool {
        self.state.read().add_default_logger
    }

    pub fn set_client_id(&self, client_id: impl Into<String>) {
        self.state.write().client_id = client_id.into();
    }

    pub fn client_id(&self) -> String {
        self.state.read().client_id.clone()
    }

    /// Swap in a complete configuration at once. The previous appenders are
    /// closed before the write lock is released, so the new ones only open
    /// once the old ones are done.
    pub fn reconfigure(&self, settings: LoggerSettings) {
        let chain: AppenderChain = Arc::new(
            settings
                .appenders
                .into_iter()
                .map(AppenderSlot::new)
                .collect(),
        );
        let mut state = self.state.write();
        state.level = settings.level;
        state.add_default_logger = settings.add_default_logger;
        state.client_id = settings.client_id;
        let previous = std::mem::replace(&mut state.appenders, chain);
        close_chain(&previous);
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn log(&self, level: LogLevel, tag: &str, message: impl Into<String>) {
        self.dispatch(level, tag, message.into(), None);
    }

    /// Log `error` and its `source()` chain; the message is the error's
    /// display text.
    pub fn log_error(&self, level: LogLevel, tag: &str, error: &(dyn Error + 'static)) {
        if !self.is_enabled(level) {
            self.metrics.record_filtered();
            return;
        }
        let throwable = Throwable::capture(error);
        self.dispatch(level, tag, throwable.description().to_string(), Some(throwable));
    }

    /// Log `message` with `error` attached.
    pub fn log_with_error(
        &self,
        level: LogLevel,
        tag: &str,
        message: impl Into<String>,
        error: &(dyn Error + 'static),
    ) {
        self.dispatch(level, tag, message.into(), Some(Throwable::capture(error)));
    }

    fn dispatch(&self, level: LogLevel, tag: &str, message: String, throwable: Option<Throwable>) {
        // Held until every appender is done with the event.
        let state = self.state.read();
        if !state.accepts(level) {
            self.metrics.record_filtered();
            return;
        }
        let chain: &[AppenderSlot] = if state.appenders.is_empty() && state.add_default_logger {
            self.default_chain.as_slice()
        } else {
            state.appenders.as_slice()
        };

        let mut event = LogEvent::new(level, tag, message).with_client_id(state.client_id.as_str());
        if let Some(throwable) = throwable {
            event = event.with_throwable(throwable);
        }

        Self::process_sync(chain, &event, &self.metrics);
    }

    /// Hand the event to every appender in order with per-appender panic
    /// isolation. Returns whether any appender failed.
    fn process_sync(chain: &[AppenderSlot], event: &LogEvent, metrics: &LoggerMetrics) -> bool {
        let mut has_error = false;

        for (idx, slot) in chain.iter().enumerate() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut appender = slot.appender.lock();
                if !appender.is_open() {
                    appender.open()?;
                }
                appender.do_log(event)
            }));

            let failure = match result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic_info) => format!("panicked: {}", panic_message(&*panic_info)),
            };

            has_error = true;
            metrics.record_appender_failure();
            let previous = slot.failures.fetch_add(1, Ordering::Relaxed);
            if diagnostics::should_alert(previous) {
                diagnostics::error(
                    "Logger",
                    format!(
                        "Appender #{} failed: {} ({} failures so far). \
                         Other appenders continue to function.",
                        idx,
                        failure,
                        previous + 1
                    ),
                );
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }
        has_error
    }

    #[inline]
    pub fn trace(&self, tag: &str, message: impl Into<String>) {
        self.log(LogLevel::Trace, tag, message);
    }

    #[inline]
    pub fn debug(&self, tag: &str, message: impl Into<String>) {
        self.log(LogLevel::Debug, tag, message);
    }

    #[inline]
    pub fn info(&self, tag: &str, message: impl Into<String>) {
        self.log(LogLevel::Info, tag, message);
    }

    #[inline]
    pub fn warn(&self, tag: &str, message: impl Into<String>) {
        self.log(LogLevel::Warn, tag, message);
    }

    #[inline]
    pub fn error(&self, tag: &str, message: impl Into<String>) {
        self.log(LogLevel::Error, tag, message);
    }

    #[inline]
    pub fn fatal(&self, tag: &str, message: impl Into<String>) {
        self.log(LogLevel::Fatal, tag, message);
    }

    pub fn trace_error(&self, tag: &str, error: &(dyn Error + 'static)) {
        self.log_error(LogLevel::Trace, tag, error);
    }

    pub fn debug_error(&self, tag: &str, error: &(dyn Error + 'static)) {
        self.log_error(LogLevel::Debug, tag, error);
    }

    pub fn info_error(&self, tag: &str, error: &(dyn Error + 'static)) {
        self.log_error(LogLevel::Info, tag, error);
    }

    pub fn warn_error(&self, tag: &str, error: &(dyn Error + 'static)) {
        self.log_error(LogLevel::Warn, tag, error);
    }

    pub fn error_error(&self, tag: &str, error: &(dyn Error + 'static)) {
        self.log_error(LogLevel::Error, tag, error);
    }

    pub fn fatal_error(&self, tag: &str, error: &(dyn Error + 'static)) {
        self.log_error(LogLevel::Fatal, tag, error);
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn close_chain(chain: &[AppenderSlot]) {
    for (idx, slot) in chain.iter().enumerate() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| slot.appender.lock().close()));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                diagnostics::error("Logger", format!("Appender #{} close failed: {}", idx, e))
            }
            Err(panic_info) => diagnostics::error(
                "Logger",
                format!(
                    "Appender #{} panicked during close: {}",
                    idx,
                    panic_message(&*panic_info)
                ),
            ),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let chain = std::mem::take(&mut self.state.get_mut().appenders);
        close_chain(&chain);
        close_chain(&self.default_chain);

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            diagnostics::warn(
                "Logger",
                format!(
                    "shutting down with {} dropped logs (drop rate: {:.2}%)",
                    dropped,
                    self.metrics.drop_rate()
                ),
            );
        }
    }
}

pub struct LoggerBuilder {
    level: Option<LogLevel>,
    appenders: Vec<SharedAppender>,
    add_default_logger: bool,
    client_id: String,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            level: None,
            appenders: Vec::new(),
            add_default_logger: true,
            client_id: String::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(shared(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_appender(mut self, appender: SharedAppender) -> Self {
        self.appenders.push(appender);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn add_default_logger(mut self, add_default_logger: bool) -> Self {
        self.add_default_logger = add_default_logger;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn build(self) -> Logger {
        let logger = Logger::new();
        logger.reconfigure(LoggerSettings {
            level: self.level,
            appenders: self.appenders,
            add_default_logger: self.add_default_logger,
            client_id: self.client_id,
        });
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
