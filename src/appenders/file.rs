//! File appender with wrap-directive rotation

use super::rotation::{LogFileName, NamingMode, RotationPolicy};
use crate::core::diagnostics;
use crate::core::{Appender, LogEvent, LoggerError, Result};
use crate::format::{Formatter, PatternFormatter};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Written every time a file is opened, so appended sessions stay apart.
pub const SEPARATOR: &str =
    "\r\n##########################################################\r\n";

/// Writes one formatted line per event and rotates according to its
/// [`RotationPolicy`].
///
/// # Examples
///
/// ```no_run
/// use microlog::appenders::FileAppender;
/// use microlog::core::{Appender, LogEvent, LogLevel};
///
/// let mut appender = FileAppender::new("/var/log/app.log").with_wrap("%s-5 %a");
/// appender.open().unwrap();
/// appender
///     .do_log(&LogEvent::new(LogLevel::Info, "app", "started"))
///     .unwrap();
/// ```
pub struct FileAppender {
    base_path: PathBuf,
    file_name: LogFileName,
    policy: RotationPolicy,
    formatter: Arc<dyn Formatter>,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    current_size: u64,
}

impl FileAppender {
    /// Create an appender for `path`. Nothing is touched on disk until
    /// [`Appender::open`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let base_path = path.into();
        let policy = RotationPolicy::default();
        let file_name = LogFileName::from_path(&base_path).with_default_stem(&policy.naming);
        Self {
            base_path,
            file_name,
            policy,
            formatter: Arc::new(PatternFormatter::default()),
            writer: None,
            current_path: None,
            current_size: 0,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RotationPolicy) -> Self {
        self.file_name =
            LogFileName::from_path(&self.base_path).with_default_stem(&policy.naming);
        self.policy = policy;
        self
    }

    /// Shorthand for `with_policy(RotationPolicy::parse(directive))`.
    #[must_use]
    pub fn with_wrap(self, directive: &str) -> Self {
        self.with_policy(RotationPolicy::parse(directive))
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Path of the file currently written to, if open.
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn open_next(&mut self) -> Result<()> {
        let path = self.policy.resolve_path(&self.file_name, Utc::now());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if self.policy.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options.open(&path).map_err(|e| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        })?;

        let existing = if self.policy.append {
            file.metadata()
                .map_err(|e| {
                    LoggerError::file_appender(
                        path.display().to_string(),
                        format!("Cannot access file metadata: {}", e),
                    )
                })?
                .len()
        } else {
            0
        };

        let mut writer = BufWriter::new(file);
        writer
            .write_all(SEPARATOR.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to write separator: {}", e),
                )
            })?;

        self.current_size = existing + SEPARATOR.len() as u64;
        self.writer = Some(writer);
        self.current_path = Some(path);
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        // Explicitly drop writer to release the file handle before any rename
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.display_path(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.policy.naming == NamingMode::None {
            if let Some(current) = self.current_path.as_deref() {
                let backup = self.policy.backup_path(&self.file_name);
                fs::rename(current, &backup).map_err(|e| {
                    LoggerError::file_rotation(
                        current.display().to_string(),
                        format!("Failed to move to '{}': {}", backup.display(), e),
                    )
                })?;
            }
        }

        self.open_next()
    }

    fn display_path(&self) -> String {
        path_label(&self.current_path, &self.base_path)
    }
}

fn path_label(current: &Option<PathBuf>, base: &Path) -> String {
    current.as_deref().unwrap_or(base).display().to_string()
}

impl Appender for FileAppender {
    fn open(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        self.open_next()
    }

    fn do_log(&mut self, event: &LogEvent) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::not_open("FileAppender"))?;

        let mut line = self.formatter.format(event);
        line.push('\n');

        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_appender(
                    path_label(&self.current_path, &self.base_path),
                    format!("Failed to write log entry: {}", e),
                )
            })?;
        self.current_size += line.len() as u64;

        // The line is already written; a failed rotation only closes the
        // file, and the next dispatch reopens it.
        if self.policy.should_rotate(self.current_size) {
            if let Err(e) = self.rotate() {
                diagnostics::error("FileAppender", e);
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(self.display_path(), format!("Failed to flush: {}", e))
            })?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Err(LoggerError::unsupported("FileAppender", "clear"))
    }

    fn log_size(&self) -> Option<u64> {
        Some(self.current_size)
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn formatter(&self) -> &Arc<dyn Formatter> {
        &self.formatter
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.formatter = formatter;
    }

    fn name(&self) -> &str {
        "FileAppender"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Best effort flush - ignore errors during drop
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::tempdir;

    fn message_only() -> Arc<dyn Formatter> {
        Arc::new(PatternFormatter::new("%m"))
    }

    fn event(message: &str) -> LogEvent {
        LogEvent::new(LogLevel::Info, "file.test", message)
    }

    #[test]
    fn test_open_writes_separator_then_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut appender = FileAppender::new(&path).with_formatter(message_only());

        assert!(!appender.is_open());
        appender.open().unwrap();
        appender.do_log(&event("first")).unwrap();
        appender.do_log(&event("second")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}first\nsecond\n", SEPARATOR));
        assert_eq!(appender.log_size(), Some(content.len() as u64));
        assert_eq!(appender.current_path(), Some(path.as_path()));
    }

    #[test]
    fn test_truncate_and_append_modes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("modes.log");
        fs::write(&path, "previous session\n").unwrap();

        let mut appender = FileAppender::new(&path).with_formatter(message_only());
        appender.open().unwrap();
        appender.close().unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("previous session"));

        fs::write(&path, "previous session\n").unwrap();
        let mut appender = FileAppender::new(&path)
            .with_wrap("%a")
            .with_formatter(message_only());
        appender.open().unwrap();
        appender.do_log(&event("next")).unwrap();
        appender.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous session\n"));
        assert!(content.ends_with("next\n"));
    }

    #[test]
    fn test_rotation_after_one_megabyte() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.log");
        let mut appender = FileAppender::new(&path)
            .with_wrap("%s-1")
            .with_formatter(message_only());
        appender.open().unwrap();

        // 62 separator bytes + 1048 lines of 1001 bytes first exceeds 1 MiB.
        let payload = "x".repeat(1000);
        for _ in 0..1050 {
            appender.do_log(&event(&payload)).unwrap();
        }
        appender.close().unwrap();

        let count_lines = |p: &Path| {
            fs::read_to_string(p)
                .unwrap()
                .lines()
                .filter(|l| l.starts_with('x'))
                .inspect(|l| assert_eq!(l.len(), 1000))
                .count()
        };
        assert_eq!(count_lines(&dir.path().join("big.1.log")), 1048);
        assert_eq!(count_lines(&path), 2);
    }

    #[test]
    fn test_repeated_rotation_keeps_every_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.log");
        let mut appender = FileAppender::new(&path)
            .with_policy(RotationPolicy::new().with_size_threshold(200))
            .with_formatter(message_only());
        appender.open().unwrap();

        for i in 0..20 {
            appender.do_log(&event(&format!("entry number {:03}", i))).unwrap();
        }
        appender.close().unwrap();

        let total: usize = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
            .map(|content| content.lines().filter(|l| l.starts_with("entry")).count())
            .sum();
        assert_eq!(total, 20);
        assert!(dir.path().join("small.1.log").exists());
        assert!(dir.path().join("small.2.log").exists());
    }

    #[test]
    fn test_failed_rotation_keeps_written_line() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("vanishing");
        let path = log_dir.join("gone.log");
        let mut appender = FileAppender::new(&path)
            .with_policy(RotationPolicy::new().with_size_threshold(10))
            .with_formatter(message_only());
        appender.open().unwrap();

        // The rename of the rotated file fails once its directory is gone.
        fs::remove_dir_all(&log_dir).unwrap();
        assert!(appender.do_log(&event("written before rotation")).is_ok());
        assert!(!appender.is_open());

        appender.open().unwrap();
        appender.do_log(&event("after reopen")).unwrap();
        let rotated = fs::read_to_string(log_dir.join("gone.1.log")).unwrap();
        assert!(rotated.contains("after reopen"));
        assert!(appender.is_open());
    }

    #[test]
    fn test_date_stamped_name() {
        let dir = tempdir().unwrap();
        let mut appender = FileAppender::new(dir.path().join("trace.log")).with_wrap("%f");
        appender.open().unwrap();

        let name = appender
            .current_path()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        let stamp = name
            .strip_prefix("trace")
            .and_then(|rest| rest.strip_suffix(".log"))
            .unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()), "{}", name);
    }

    #[test]
    fn test_auto_index_picks_next_free_name() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("run.log");

        let mut first = FileAppender::new(&base).with_wrap("%p");
        first.open().unwrap();
        let mut second = FileAppender::new(&base).with_wrap("%p");
        second.open().unwrap();

        assert_eq!(first.current_path(), Some(dir.path().join("run0.log").as_path()));
        assert_eq!(second.current_path(), Some(dir.path().join("run1.log").as_path()));
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");
        let mut appender = FileAppender::new(&path);
        appender.open().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_writes() {
        let dir = tempdir().unwrap();
        let mut appender = FileAppender::new(dir.path().join("closed.log"));
        appender.open().unwrap();
        appender.close().unwrap();
        appender.close().unwrap();

        assert!(!appender.is_open());
        assert!(matches!(
            appender.do_log(&event("late")),
            Err(LoggerError::NotOpen { .. })
        ));
    }

    #[test]
    fn test_clear_is_unsupported() {
        let dir = tempdir().unwrap();
        let mut appender = FileAppender::new(dir.path().join("c.log"));
        assert!(matches!(
            appender.clear(),
            Err(LoggerError::Unsupported { .. })
        ));
    }
}
