//! Appender implementations

pub mod console;
pub mod datagram;
pub mod file;
pub mod rotation;

pub use console::{ConsoleAppender, ConsoleTarget};
pub use datagram::DatagramAppender;
pub use file::FileAppender;
pub use rotation::{LogFileName, NamingMode, RotationPolicy};

pub use crate::core::Appender;
