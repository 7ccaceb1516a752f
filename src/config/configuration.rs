//! Resolved configuration record

use crate::appenders::datagram::{DEFAULT_HOST, DEFAULT_PORT};
use crate::core::diagnostics;
use crate::core::LogLevel;
use crate::format::DEFAULT_PATTERN;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Prefix of every key in a classic property map.
pub const PROPERTY_PREFIX: &str = "microlog.";

pub const LEVEL_KEY: &str = "microlog.level";
pub const APPENDER_KEY: &str = "microlog.appender";
pub const FORMATTER_KEY: &str = "microlog.formatter";
pub const PATTERN_KEY: &str = "microlog.formatter.PatternFormatter.pattern";
pub const FILE_NAME_KEY: &str = "microlog.appender.FileAppender.File";
pub const FILE_WRAP_KEY: &str = "microlog.appender.FileAppender.Options";
pub const DATAGRAM_HOST_KEY: &str = "microlog.appender.DatagramAppender.Host";
pub const DATAGRAM_PORT_KEY: &str = "microlog.appender.DatagramAppender.Port";
pub const ADD_DEFAULT_LOGGER_KEY: &str = "microlog.addDefaultLogger";
pub const CLIENT_ID_KEY: &str = "microlog.clientId";

pub const DEFAULT_APPENDER: &str = "ConsoleAppender";
pub const DEFAULT_FORMATTER: &str = "PatternFormatter";
pub const DEFAULT_FILE_NAME: &str = "log";

/// Everything the configurator needs to rebuild the root logger.
///
/// Missing fields take their defaults, both when deserializing and when
/// reading a property map.
///
/// # Examples
///
/// ```
/// use microlog::config::Configuration;
/// use microlog::LogLevel;
///
/// let config = Configuration::new()
///     .with_level(LogLevel::Info)
///     .with_appenders(["ConsoleAppender", "FileAppender"])
///     .with_file_name("app.log")
///     .with_file_wrap("%s-2 %a");
///
/// assert_eq!(config.appenders.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Minimum level; `None` keeps the logger default
    pub level: Option<LogLevel>,
    /// Appender names in dispatch order
    pub appenders: Vec<String>,
    pub formatter: String,
    pub pattern: String,
    /// Base file name; relative names are joined onto `log_directory`
    pub file_name: String,
    /// Wrap directive for the file appender
    pub file_wrap: String,
    pub datagram_host: String,
    pub datagram_port: u16,
    pub add_default_logger: bool,
    pub client_id: String,
    pub log_directory: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            level: None,
            appenders: vec![DEFAULT_APPENDER.to_string()],
            formatter: DEFAULT_FORMATTER.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            file_wrap: String::new(),
            datagram_host: DEFAULT_HOST.to_string(),
            datagram_port: DEFAULT_PORT,
            add_default_logger: false,
            client_id: String::new(),
            log_directory: None,
        }
    }
}

impl Configuration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a classic `microlog.*` key/value map.
    ///
    /// Unparseable values are reported as warnings and leave the default in
    /// place; keys outside the prefix are ignored.
    pub fn from_properties(properties: &HashMap<String, String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| properties.get(key).map(|v| v.trim());

        if let Some(value) = get(LEVEL_KEY) {
            match value.parse::<LogLevel>() {
                Ok(level) => config.level = Some(level),
                Err(e) => diagnostics::warn("Configuration", e),
            }
        }
        if let Some(value) = get(APPENDER_KEY) {
            config.appenders = split_names(value);
        }
        if let Some(value) = get(FORMATTER_KEY).filter(|v| !v.is_empty()) {
            config.formatter = value.to_string();
        }
        if let Some(value) = properties.get(PATTERN_KEY) {
            config.pattern = value.clone();
        }
        if let Some(value) = get(FILE_NAME_KEY) {
            config.file_name = value.to_string();
        }
        if let Some(value) = get(FILE_WRAP_KEY) {
            config.file_wrap = value.to_string();
        }
        if let Some(value) = get(DATAGRAM_HOST_KEY).filter(|v| !v.is_empty()) {
            config.datagram_host = value.to_string();
        }
        if let Some(value) = get(DATAGRAM_PORT_KEY) {
            match value.parse() {
                Ok(port) => config.datagram_port = port,
                Err(_) => diagnostics::warn(
                    "Configuration",
                    format!("ignoring invalid datagram port '{}'", value),
                ),
            }
        }
        if let Some(value) = get(ADD_DEFAULT_LOGGER_KEY) {
            config.add_default_logger = value.eq_ignore_ascii_case("true");
        }
        if let Some(value) = get(CLIENT_ID_KEY) {
            config.client_id = value.to_string();
        }

        for key in properties.keys() {
            if key.starts_with(PROPERTY_PREFIX) && !is_known_key(key) {
                diagnostics::warn("Configuration", format!("ignoring unknown key '{}'", key));
            }
        }

        config
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_appenders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.appenders = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = formatter.into();
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn with_file_wrap(mut self, directive: impl Into<String>) -> Self {
        self.file_wrap = directive.into();
        self
    }

    #[must_use]
    pub fn with_datagram_destination(mut self, host: impl Into<String>, port: u16) -> Self {
        self.datagram_host = host.into();
        self.datagram_port = port;
        self
    }

    #[must_use]
    pub fn with_add_default_logger(mut self, add_default_logger: bool) -> Self {
        self.add_default_logger = add_default_logger;
        self
    }

    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    #[must_use]
    pub fn with_log_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Base path for the file appender: `file_name` joined onto
    /// `log_directory` unless it is already absolute.
    pub fn file_path(&self) -> PathBuf {
        let name = PathBuf::from(&self.file_name);
        match &self.log_directory {
            Some(directory) if name.is_relative() => directory.join(name),
            _ => name,
        }
    }
}

fn split_names(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn is_known_key(key: &str) -> bool {
    [
        LEVEL_KEY,
        APPENDER_KEY,
        FORMATTER_KEY,
        PATTERN_KEY,
        FILE_NAME_KEY,
        FILE_WRAP_KEY,
        DATAGRAM_HOST_KEY,
        DATAGRAM_PORT_KEY,
        ADD_DEFAULT_LOGGER_KEY,
        CLIENT_ID_KEY,
    ]
    .contains(&key)
}
