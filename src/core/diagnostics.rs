//! Internal diagnostics channel
//!
//! Failures inside the logging path are reported here, straight to stderr,
//! and never through the configured appenders.

use std::io::Write;

/// Repeated failures are only reported on the first occurrence and on every
/// `ALERT_INTERVAL`-th occurrence after it.
pub const ALERT_INTERVAL: u64 = 1000;

pub(crate) fn warn(component: &str, message: impl std::fmt::Display) {
    emit("LOGGER WARNING", component, &message);
}

pub(crate) fn error(component: &str, message: impl std::fmt::Display) {
    emit("LOGGER ERROR", component, &message);
}

/// Whether the `previous`-th failure (zero based) should be reported.
pub(crate) fn should_alert(previous: u64) -> bool {
    previous == 0 || (previous + 1) % ALERT_INTERVAL == 0
}

fn emit(prefix: &str, component: &str, message: &dyn std::fmt::Display) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "[{}] {}: {}", prefix, component, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_throttling() {
        assert!(should_alert(0));
        assert!(!should_alert(1));
        assert!(!should_alert(998));
        assert!(should_alert(999));
        assert!(should_alert(1999));
    }
}
