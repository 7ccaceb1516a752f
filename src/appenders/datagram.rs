//! UDP datagram appender
//!
//! Sends each formatted event as one datagram. Delivery is fire-and-forget:
//! a failed send is counted and reported on the diagnostics channel, never
//! returned to the caller, and the next event is sent as usual.

use crate::core::diagnostics;
use crate::core::{Appender, LogEvent, LoggerError, Result};
use crate::format::{Formatter, PatternFormatter};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;

pub const DEFAULT_HOST: &str = "127.0.0.1";
/// No port is assumed; it has to be configured.
pub const DEFAULT_PORT: u16 = 0;

const PACKET_BUFFER_CAPACITY: usize = 1024;

/// # Examples
///
/// ```no_run
/// use microlog::appenders::DatagramAppender;
/// use microlog::core::Appender;
///
/// let mut appender = DatagramAppender::new("logs.example.com", 5140);
/// appender.open().unwrap();
/// appender.send_message("hello collector");
/// ```
pub struct DatagramAppender {
    host: String,
    port: u16,
    formatter: Arc<dyn Formatter>,
    socket: Option<UdpSocket>,
    destination: Option<SocketAddr>,
    buffer: Vec<u8>,
    sent: u64,
    failed_sends: u64,
}

impl DatagramAppender {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            formatter: Arc::new(PatternFormatter::default()),
            socket: None,
            destination: None,
            buffer: Vec::new(),
            sent: 0,
            failed_sends: 0,
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address resolved by the last successful `open`.
    pub fn destination(&self) -> Option<SocketAddr> {
        self.destination
    }

    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    pub fn failed_sends(&self) -> u64 {
        self.failed_sends
    }

    /// Send `message` as one datagram, reusing the packet buffer.
    pub fn send_message(&mut self, message: &str) {
        let (Some(socket), Some(destination)) = (self.socket.as_ref(), self.destination) else {
            self.record_failure("appender is not open");
            return;
        };

        self.buffer.clear();
        self.buffer.extend_from_slice(message.as_bytes());

        match socket.send_to(&self.buffer, destination) {
            Ok(_) => self.sent += 1,
            Err(e) => {
                let reason = format!("failed to send datagram to {}: {}", destination, e);
                self.record_failure(&reason);
            }
        }
    }

    fn record_failure(&mut self, reason: &str) {
        let previous = self.failed_sends;
        self.failed_sends += 1;
        if diagnostics::should_alert(previous) {
            diagnostics::error(
                "DatagramAppender",
                format!("{} (failure #{})", reason, self.failed_sends),
            );
        }
    }

    fn resolve(&self) -> Result<SocketAddr> {
        let address = format!("{}:{}", self.host, self.port);
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| LoggerError::address(&address, e.to_string()))?
            .next()
            .ok_or_else(|| LoggerError::address(&address, "no addresses found"))
    }
}

impl Default for DatagramAppender {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl Appender for DatagramAppender {
    fn open(&mut self) -> Result<()> {
        let destination = self.resolve()?;
        let local = if destination.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).map_err(|e| {
            LoggerError::io_operation(
                "bind datagram socket",
                format!("Failed to bind local address {}", local),
                e,
            )
        })?;

        self.buffer = Vec::with_capacity(PACKET_BUFFER_CAPACITY);
        self.destination = Some(destination);
        self.socket = Some(socket);
        Ok(())
    }

    fn do_log(&mut self, event: &LogEvent) -> Result<()> {
        if self.socket.is_none() {
            return Err(LoggerError::not_open("DatagramAppender"));
        }
        let message = self.formatter.format(event);
        self.send_message(&message);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.socket = None;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn log_size(&self) -> Option<u64> {
        None
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn formatter(&self) -> &Arc<dyn Formatter> {
        &self.formatter
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.formatter = formatter;
    }

    fn name(&self) -> &str {
        "DatagramAppender"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::time::Duration;

    fn receiver() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        socket
    }

    #[test]
    fn test_event_arrives_as_one_datagram() {
        let collector = receiver();
        let port = collector.local_addr().unwrap().port();

        let mut appender = DatagramAppender::new("127.0.0.1", port)
            .with_formatter(Arc::new(PatternFormatter::new("[%p] %c{-1}: %m")));
        appender.open().unwrap();
        assert_eq!(appender.destination().unwrap().port(), port);

        let event = LogEvent::new(LogLevel::Warn, "net.Client", "link down");
        appender.do_log(&event).unwrap();

        let mut buf = [0u8; 256];
        let n = collector.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"[WARN] net.Client: link down");
        assert_eq!(appender.sent_count(), 1);
        assert_eq!(appender.failed_sends(), 0);
    }

    #[test]
    fn test_buffer_is_reused_between_messages() {
        let collector = receiver();
        let port = collector.local_addr().unwrap().port();
        let mut appender = DatagramAppender::new("127.0.0.1", port);
        appender.open().unwrap();

        appender.send_message("a much longer first message");
        appender.send_message("short");

        let mut buf = [0u8; 256];
        let n = collector.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"a much longer first message");
        let n = collector.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"short");
    }

    #[test]
    fn test_unreachable_destination_never_fails_caller() {
        // Port 0 is not a valid destination; every send fails.
        let mut appender = DatagramAppender::default();
        appender.open().unwrap();

        let event = LogEvent::new(LogLevel::Error, "net", "dropped");
        assert!(appender.do_log(&event).is_ok());
        assert!(appender.do_log(&event).is_ok());
        appender.send_message("still trying");

        assert_eq!(appender.failed_sends(), 3);
        assert_eq!(appender.sent_count(), 0);
    }

    #[test]
    fn test_send_before_open_is_counted() {
        let mut appender = DatagramAppender::new(DEFAULT_HOST, 9);
        appender.send_message("early");
        assert_eq!(appender.failed_sends(), 1);
        assert!(matches!(
            appender.do_log(&LogEvent::new(LogLevel::Info, "n", "m")),
            Err(LoggerError::NotOpen { .. })
        ));
    }

    #[test]
    fn test_close_releases_socket() {
        let mut appender = DatagramAppender::new(DEFAULT_HOST, 9);
        appender.open().unwrap();
        assert!(appender.is_open());
        appender.close().unwrap();
        appender.close().unwrap();
        assert!(!appender.is_open());
        assert_eq!(appender.log_size(), None);
        assert!(appender.clear().is_ok());
    }
}
