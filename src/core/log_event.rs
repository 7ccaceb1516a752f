//! Log event structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::sync::OnceLock;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

static START_TIME: OnceLock<DateTime<Utc>> = OnceLock::new();

/// Instant the logging core first produced an event; base for `%r`.
pub fn start_time() -> DateTime<Utc> {
    *START_TIME.get_or_init(Utc::now)
}

fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Sanitize text to prevent log injection
///
/// Replaces newlines, carriage returns, and tabs with escape sequences so an
/// event always occupies exactly one line.
pub(crate) fn sanitize(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// A captured error value and its `source()` chain, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throwable {
    chain: Vec<String>,
}

impl Throwable {
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        let mut chain = vec![sanitize(&error.to_string())];
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(sanitize(&cause.to_string()));
            source = cause.source();
        }
        Self { chain }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            chain: vec![sanitize(&message.into())],
        }
    }

    pub fn description(&self) -> &str {
        self.chain.first().map(String::as_str).unwrap_or_default()
    }

    pub fn causes(&self) -> &[String] {
        self.chain.get(1..).unwrap_or_default()
    }

    /// Single-line rendering, keeping at most `depth` causes.
    pub fn render(&self, depth: Option<usize>) -> String {
        let mut out = self.description().to_string();
        let causes = self.causes();
        let keep = depth.unwrap_or(causes.len()).min(causes.len());
        for cause in &causes[..keep] {
            out.push_str("; caused by: ");
            out.push_str(cause);
        }
        out
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

/// One immutable logging occurrence.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub client_id: String,
    /// Logger name or caller tag, dot separated for `%c` truncation.
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub throwable: Option<Throwable>,
    pub thread_id: String,
    pub thread_name: Option<String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, name: impl Into<String>, message: impl Into<String>) -> Self {
        start_time();
        Self {
            client_id: String::new(),
            name: sanitize(&name.into()),
            timestamp: Utc::now(),
            level,
            message: sanitize(&message.into()),
            throwable: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
        }
    }

    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = sanitize(&client_id.into());
        self
    }

    #[must_use]
    pub fn with_throwable(mut self, throwable: Throwable) -> Self {
        self.throwable = Some(throwable);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Thread name when the thread has one, its id otherwise.
    pub fn thread(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "request failed")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection reset\nby peer")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    impl Error for Inner {}

    #[test]
    fn test_name_and_client_id_are_sanitized() {
        let event = LogEvent::new(LogLevel::Warn, "net\nFAKE ERROR", "m")
            .with_client_id("unit\r\n7");
        assert_eq!(event.name, "net\\nFAKE ERROR");
        assert_eq!(event.client_id, "unit\\r\\n7");
        assert!(!event.name.contains('\n'));
    }

    #[test]
    fn test_message_is_sanitized() {
        let event = LogEvent::new(LogLevel::Info, "app", "line one\nline two\ttab");
        assert_eq!(event.message, "line one\\nline two\\ttab");
    }

    #[test]
    fn test_throwable_chain_is_single_line() {
        let throwable = Throwable::capture(&Outer(Inner));
        assert_eq!(throwable.description(), "request failed");
        assert_eq!(throwable.causes(), ["connection reset\\nby peer"]);
        assert_eq!(
            throwable.to_string(),
            "request failed; caused by: connection reset\\nby peer"
        );
        assert_eq!(throwable.render(Some(0)), "request failed");
    }

    #[test]
    fn test_thread_falls_back_to_id() {
        let handle = std::thread::spawn(|| LogEvent::new(LogLevel::Info, "t", "m"));
        let event = handle.join().unwrap();
        assert_eq!(event.thread(), event.thread_id);

        let handle = std::thread::Builder::new()
            .name("worker-1".into())
            .spawn(|| LogEvent::new(LogLevel::Info, "t", "m"))
            .unwrap();
        assert_eq!(handle.join().unwrap().thread(), "worker-1");
    }

    #[test]
    fn test_builder_fields() {
        let event = LogEvent::new(LogLevel::Warn, "a.b", "m")
            .with_client_id("com.example")
            .with_throwable(Throwable::from_message("boom"));
        assert_eq!(event.client_id, "com.example");
        assert_eq!(event.throwable.unwrap().description(), "boom");
        assert!(start_time() <= event.timestamp);
    }
}
