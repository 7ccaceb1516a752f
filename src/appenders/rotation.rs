//! File naming and size-triggered rotation
//!
//! A [`RotationPolicy`] is parsed from a wrap directive made of `%`-prefixed
//! tokens, in any order, scanned left to right (a later token overrides an
//! earlier one):
//!
//! | Token | Meaning |
//! |---|---|
//! | `%f[-format]` | date-stamped names, default format `yyyyMMddHHmmss` |
//! | `%s-<megabytes>` | rotate once the file exceeds this size (fractions allowed) |
//! | `%p` | auto-indexed names: `<stem>0.log`, `<stem>1.log`, ... |
//! | `%a` | append to an existing file instead of truncating it |
//!
//! Malformed or unknown tokens are ignored and the defaults stay in place.

use crate::core::diagnostics;
use crate::core::timestamp::{compile_date_pattern, FILE_STAMP_PATTERN};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Stem used when no base name is configured and names are not generated.
pub const DEFAULT_FILE_STEM: &str = "autoGen";
pub const DEFAULT_FILE_EXTENSION: &str = ".log";

const RANDOM_PREFIX_LEN: usize = 8;

/// How the appender names the file it opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NamingMode {
    /// Fixed `<stem><ext>`
    #[default]
    None,
    /// `<stem><stamp><ext>`, stamp rendered from the letter date pattern
    DateStamp(String),
    /// `<stem><N><ext>` for the first free N starting at 0
    AutoIndex,
}

/// Parsed wrap directive
///
/// # Examples
///
/// ```
/// use microlog::appenders::{NamingMode, RotationPolicy};
///
/// let policy = RotationPolicy::parse("%f-yyyyMMdd %s-0.5 %a");
/// assert_eq!(policy.naming, NamingMode::DateStamp("yyyyMMdd".to_string()));
/// assert_eq!(policy.size_threshold_bytes, 512 * 1024);
/// assert!(policy.append);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size that triggers rotation; 0 disables size rotation
    pub size_threshold_bytes: u64,
    pub naming: NamingMode,
    /// Append to an existing file instead of truncating it
    pub append: bool,
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(directive: &str) -> Self {
        let mut policy = Self::default();

        let mut rest = match directive.find('%') {
            Some(idx) => &directive[idx..],
            None => return policy,
        };

        while !rest.is_empty() {
            let end = rest[1..].find('%').map_or(rest.len(), |i| i + 1);
            let token = &rest[..end];
            policy.apply_token(token);
            rest = &rest[end..];
        }

        policy
    }

    fn apply_token(&mut self, token: &str) {
        let mut chars = token.chars();
        chars.next();
        let key = chars.next();
        let argument = chars.as_str().trim();
        let argument = argument.strip_prefix('-').unwrap_or(argument).trim();

        match key {
            Some('f') => {
                let format = if argument.is_empty() {
                    FILE_STAMP_PATTERN
                } else {
                    argument
                };
                self.naming = NamingMode::DateStamp(format.to_string());
            }
            Some('s') => match argument.parse::<f64>() {
                Ok(megabytes) if megabytes.is_finite() && megabytes >= 0.0 => {
                    self.size_threshold_bytes = (megabytes * BYTES_PER_MEGABYTE) as u64;
                }
                _ => diagnostics::warn(
                    "RotationPolicy",
                    format!("ignoring malformed size in wrap token '{}'", token.trim()),
                ),
            },
            Some('p') => self.naming = NamingMode::AutoIndex,
            Some('a') => self.append = true,
            _ => diagnostics::warn(
                "RotationPolicy",
                format!("ignoring unknown wrap token '{}'", token.trim()),
            ),
        }
    }

    /// Set the size threshold in bytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_size_threshold(mut self, bytes: u64) -> Self {
        self.size_threshold_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn rotation_enabled(&self) -> bool {
        self.size_threshold_bytes > 0
    }

    /// Whether a file of `current_size` bytes must be rotated.
    pub fn should_rotate(&self, current_size: u64) -> bool {
        self.rotation_enabled() && current_size > self.size_threshold_bytes
    }

    /// Path of the file to open at `now`.
    pub fn resolve_path(&self, name: &LogFileName, now: DateTime<Utc>) -> PathBuf {
        match &self.naming {
            NamingMode::None => name.path(&name.stem),
            NamingMode::DateStamp(format) => {
                let stamp = now.format(&compile_date_pattern(format)).to_string();
                let stamped = format!("{}{}", name.stem, stamp);
                let candidate = name.path(&stamped);
                if self.rotation_enabled() && candidate.exists() {
                    let n = first_free_index(1, |n| name.path(&format!("{}_{}", stamped, n)));
                    name.path(&format!("{}_{}", stamped, n))
                } else {
                    candidate
                }
            }
            NamingMode::AutoIndex => {
                let n = first_free_index(0, |n| name.path(&format!("{}{}", name.stem, n)));
                name.path(&format!("{}{}", name.stem, n))
            }
        }
    }

    /// Where a fixed-name file is moved when it is rotated out.
    pub fn backup_path(&self, name: &LogFileName) -> PathBuf {
        let n = first_free_index(1, |n| name.path(&format!("{}.{}", name.stem, n)));
        name.path(&format!("{}.{}", name.stem, n))
    }
}

impl FromStr for RotationPolicy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Probe candidates from `start` upward and return the first index whose
/// path does not exist.
fn first_free_index(start: u64, candidate: impl Fn(u64) -> PathBuf) -> u64 {
    (start..)
        .find(|&n| !candidate(n).exists())
        .unwrap_or(start)
}

/// Directory, stem and extension every generated file name is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileName {
    pub directory: PathBuf,
    pub stem: String,
    pub extension: String,
}

impl LogFileName {
    /// Split a configured base path; an existing directory yields an empty
    /// stem, a missing extension becomes `.log`.
    pub fn from_path(path: &Path) -> Self {
        if path.is_dir() {
            return Self {
                directory: path.to_path_buf(),
                stem: String::new(),
                extension: DEFAULT_FILE_EXTENSION.to_string(),
            };
        }

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| DEFAULT_FILE_EXTENSION.to_string());

        Self {
            directory,
            stem,
            extension,
        }
    }

    /// Fill an empty stem the way `naming` needs it: date stamps stand on
    /// their own, fixed names get [`DEFAULT_FILE_STEM`], auto-indexed names a
    /// random prefix chosen once.
    #[must_use]
    pub fn with_default_stem(mut self, naming: &NamingMode) -> Self {
        if self.stem.is_empty() {
            match naming {
                NamingMode::None => self.stem = DEFAULT_FILE_STEM.to_string(),
                NamingMode::AutoIndex => self.stem = random_prefix(RANDOM_PREFIX_LEN),
                NamingMode::DateStamp(_) => {}
            }
        }
        self
    }

    fn path(&self, stem: &str) -> PathBuf {
        self.directory.join(format!("{}{}", stem, self.extension))
    }
}

fn random_prefix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    fn name_in(dir: &Path, stem: &str) -> LogFileName {
        LogFileName {
            directory: dir.to_path_buf(),
            stem: stem.to_string(),
            extension: ".log".to_string(),
        }
    }

    #[test]
    fn test_parse_tokens() {
        let policy = RotationPolicy::parse("%s-1");
        assert_eq!(policy.size_threshold_bytes, 1_048_576);
        assert_eq!(policy.naming, NamingMode::None);
        assert!(!policy.append);

        let policy = RotationPolicy::parse("%p%a");
        assert_eq!(policy.naming, NamingMode::AutoIndex);
        assert!(policy.append);
        assert!(!policy.rotation_enabled());
    }

    #[test]
    fn test_parse_date_default_and_custom() {
        assert_eq!(
            RotationPolicy::parse("%f").naming,
            NamingMode::DateStamp("yyyyMMddHHmmss".to_string())
        );
        assert_eq!(
            RotationPolicy::parse("%f-yyyy-MM-dd").naming,
            NamingMode::DateStamp("yyyy-MM-dd".to_string())
        );
    }

    #[test]
    fn test_later_token_overrides() {
        let policy = RotationPolicy::parse("%f %s-2 %p %s-3");
        assert_eq!(policy.naming, NamingMode::AutoIndex);
        assert_eq!(policy.size_threshold_bytes, 3 * 1_048_576);
    }

    #[test]
    fn test_malformed_tokens_are_ignored() {
        let policy = RotationPolicy::parse("junk %s-lots %x %s- %s--4");
        assert_eq!(policy, RotationPolicy::default());

        let policy: RotationPolicy = "%s-2 %s-abc".parse().unwrap();
        assert_eq!(policy.size_threshold_bytes, 2 * 1_048_576);
    }

    #[test]
    fn test_zero_threshold_never_rotates() {
        let policy = RotationPolicy::parse("%f %s-0");
        assert!(!policy.should_rotate(u64::MAX));

        let policy = RotationPolicy::new().with_size_threshold(10);
        assert!(!policy.should_rotate(10));
        assert!(policy.should_rotate(11));
    }

    #[test]
    fn test_fixed_name_and_backup() {
        let dir = tempdir().unwrap();
        let name = name_in(dir.path(), "app");
        let policy = RotationPolicy::new();
        let now = Utc::now();

        assert_eq!(policy.resolve_path(&name, now), dir.path().join("app.log"));
        assert_eq!(policy.backup_path(&name), dir.path().join("app.1.log"));

        fs::write(dir.path().join("app.1.log"), "old").unwrap();
        assert_eq!(policy.backup_path(&name), dir.path().join("app.2.log"));
    }

    #[test]
    fn test_date_stamp_name() {
        let dir = tempdir().unwrap();
        let name = name_in(dir.path(), "app");
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();

        let policy = RotationPolicy::parse("%f");
        let path = policy.resolve_path(&name, at);
        assert_eq!(path, dir.path().join("app20250108103045.log"));

        // Same second while size rotation is active: disambiguate.
        fs::write(&path, "full").unwrap();
        let policy = RotationPolicy::parse("%f %s-1");
        assert_eq!(
            policy.resolve_path(&name, at),
            dir.path().join("app20250108103045_1.log")
        );
    }

    #[test]
    fn test_auto_index_scans_all_existing_files() {
        let dir = tempdir().unwrap();
        let name = name_in(dir.path(), "trace");
        let policy = RotationPolicy::parse("%p");

        fs::write(dir.path().join("unrelated.txt"), "").unwrap();
        fs::write(dir.path().join("trace0.log"), "").unwrap();
        fs::write(dir.path().join("trace1.log"), "").unwrap();
        fs::write(dir.path().join("trace3.log"), "").unwrap();

        assert_eq!(
            policy.resolve_path(&name, Utc::now()),
            dir.path().join("trace2.log")
        );
    }

    #[test]
    fn test_file_name_splitting() {
        let name = LogFileName::from_path(Path::new("logs/app.txt"));
        assert_eq!(name.directory, PathBuf::from("logs"));
        assert_eq!(name.stem, "app");
        assert_eq!(name.extension, ".txt");

        let name = LogFileName::from_path(Path::new("app"));
        assert_eq!(name.directory, PathBuf::from("."));
        assert_eq!(name.extension, ".log");

        let dir = tempdir().unwrap();
        let name = LogFileName::from_path(dir.path());
        assert!(name.stem.is_empty());
    }

    #[test]
    fn test_default_stems() {
        let dir = tempdir().unwrap();
        let base = LogFileName::from_path(dir.path());

        let fixed = base.clone().with_default_stem(&NamingMode::None);
        assert_eq!(fixed.stem, DEFAULT_FILE_STEM);

        let indexed = base.clone().with_default_stem(&NamingMode::AutoIndex);
        assert_eq!(indexed.stem.len(), 8);
        assert!(indexed.stem.chars().all(|c| c.is_ascii_alphanumeric()));

        let stamped = base.with_default_stem(&NamingMode::DateStamp("yyyy".into()));
        assert!(stamped.stem.is_empty());
    }
}
