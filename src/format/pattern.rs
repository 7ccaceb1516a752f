//! Pattern formatter
//!
//! The pattern string is parsed exactly once into an ordered sequence of
//! literal fragments and [`FormatCommand`]s. Formatting walks that sequence;
//! it never re-reads the pattern.
//!
//! Syntax: `%[-][width]<directive>[{specifier}]`, `%%` for a literal percent.
//! Unknown directives are dropped with a warning.

use super::command::FormatCommand;
use super::Formatter;
use crate::core::diagnostics;
use crate::core::LogEvent;

pub const DEFAULT_PATTERN: &str = "%r %c{1} [%P] %m %T";

/// Widest accepted `%Nx` modifier; wider ones are ignored.
pub const MAX_PADDING_WIDTH: usize = 1024;

/// Minimum-width modifier (`%5p` pads left, `%-5p` pads right).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub min_width: usize,
    pub left_align: bool,
}

impl Padding {
    fn apply(&self, text: String) -> String {
        let len = text.chars().count();
        if len >= self.min_width {
            return text;
        }
        let fill = " ".repeat(self.min_width - len);
        if self.left_align {
            text + &fill
        } else {
            fill + &text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    Literal(String),
    Command {
        command: FormatCommand,
        padding: Option<Padding>,
    },
}

/// # Examples
///
/// ```
/// use microlog::core::{LogEvent, LogLevel};
/// use microlog::format::{Formatter, PatternFormatter};
///
/// let formatter = PatternFormatter::new("%c{1} [%p] %m");
/// let event = LogEvent::new(LogLevel::Error, "a.b.Foo", "x");
/// assert_eq!(formatter.format(&event), "Foo [ERROR] x");
/// ```
#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    tokens: Vec<PatternToken>,
}

impl PatternFormatter {
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let tokens = parse_pattern(&pattern);
        Self { pattern, tokens }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(self.pattern.len() + event.message.len() + 32);
        for token in &self.tokens {
            match token {
                PatternToken::Literal(text) => out.push_str(text),
                PatternToken::Command {
                    command,
                    padding: None,
                } => out.push_str(&command.execute(event)),
                PatternToken::Command {
                    command,
                    padding: Some(padding),
                } => out.push_str(&padding.apply(command.execute(event))),
            }
        }
        out
    }

    fn name(&self) -> &str {
        "PatternFormatter"
    }
}

fn flush_literal(tokens: &mut Vec<PatternToken>, literal: &mut String) {
    if !literal.is_empty() {
        tokens.push(PatternToken::Literal(std::mem::take(literal)));
    }
}

/// Parse a pattern into its token sequence.
pub fn parse_pattern(pattern: &str) -> Vec<PatternToken> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '%' {
            literal.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        i += 1;

        if chars.get(i) == Some(&'%') {
            literal.push('%');
            i += 1;
            continue;
        }

        let left_align = chars.get(i) == Some(&'-');
        if left_align {
            i += 1;
        }
        let digits: String = chars[i..].iter().take_while(|c| c.is_ascii_digit()).collect();
        i += digits.len();

        let Some(&directive) = chars.get(i) else {
            // Dangling '%' at the end of the pattern stays literal.
            literal.extend(&chars[start..]);
            break;
        };
        i += 1;

        let mut specifier = None;
        if chars.get(i) == Some(&'{') {
            if let Some(close) = chars[i..].iter().position(|&c| c == '}') {
                specifier = Some(chars[i + 1..i + close].iter().collect::<String>());
                i += close + 1;
            }
        }

        let padding = match digits.parse::<usize>() {
            Ok(min_width) if min_width > 0 && min_width <= MAX_PADDING_WIDTH => Some(Padding {
                min_width,
                left_align,
            }),
            Ok(0) => None,
            _ if digits.is_empty() => None,
            _ => {
                diagnostics::warn(
                    "PatternFormatter",
                    format!(
                        "ignoring width {} of '%{}' (maximum {})",
                        digits, directive, MAX_PADDING_WIDTH
                    ),
                );
                None
            }
        };

        match FormatCommand::init(directive, specifier.as_deref()) {
            Some(command) => {
                flush_literal(&mut tokens, &mut literal);
                tokens.push(PatternToken::Command { command, padding });
            }
            None => diagnostics::warn(
                "PatternFormatter",
                format!("ignoring unknown directive '%{}' in '{}'", directive, pattern),
            ),
        }
    }

    flush_literal(&mut tokens, &mut literal);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, Throwable};
    use crate::format::CategoryCommand;

    #[test]
    fn test_category_priority_message() {
        let formatter = PatternFormatter::new("%c{1} [%p] %m");
        let event = LogEvent::new(LogLevel::Error, "a.b.Foo", "x");
        assert_eq!(formatter.format(&event), "Foo [ERROR] x");
    }

    #[test]
    fn test_tokens_built_once_in_order() {
        let formatter = PatternFormatter::new("<%c{-1}|%P>");
        assert_eq!(
            formatter.tokens(),
            &[
                PatternToken::Literal("<".to_string()),
                PatternToken::Command {
                    command: FormatCommand::Category(CategoryCommand::new(-1)),
                    padding: None,
                },
                PatternToken::Literal("|".to_string()),
                PatternToken::Command {
                    command: FormatCommand::Priority,
                    padding: None,
                },
                PatternToken::Literal(">".to_string()),
            ]
        );
    }

    #[test]
    fn test_percent_escape_and_dangling_percent() {
        let formatter = PatternFormatter::new("100%% %m %");
        let event = LogEvent::new(LogLevel::Info, "t", "done");
        assert_eq!(formatter.format(&event), "100% done %");
    }

    #[test]
    fn test_unknown_directive_is_dropped() {
        let formatter = PatternFormatter::new("[%q]%m");
        let event = LogEvent::new(LogLevel::Info, "t", "m");
        assert_eq!(formatter.format(&event), "[]m");
    }

    #[test]
    fn test_padding_modifiers() {
        let formatter = PatternFormatter::new("[%-5p][%5p]");
        let event = LogEvent::new(LogLevel::Info, "t", "m");
        assert_eq!(formatter.format(&event), "[INFO ][ INFO]");
    }

    #[test]
    fn test_oversized_width_is_ignored() {
        let event = LogEvent::new(LogLevel::Info, "t", "m");
        for width in [
            usize::MAX.to_string(),
            "99999999999999999999999".to_string(),
            (MAX_PADDING_WIDTH + 1).to_string(),
        ] {
            let formatter = PatternFormatter::new(format!("[%{}p]", width));
            assert_eq!(formatter.format(&event), "[INFO]");
        }

        let formatter = PatternFormatter::new(format!("%-{}p|", MAX_PADDING_WIDTH));
        assert_eq!(formatter.format(&event).len(), MAX_PADDING_WIDTH + 1);
    }

    #[test]
    fn test_unclosed_specifier_is_literal() {
        let formatter = PatternFormatter::new("%c{2 tail");
        let event = LogEvent::new(LogLevel::Info, "a.b.Foo", "m");
        assert_eq!(formatter.format(&event), "Foo{2 tail");
    }

    #[test]
    fn test_default_pattern() {
        let formatter = PatternFormatter::default();
        assert_eq!(formatter.pattern(), DEFAULT_PATTERN);

        let event = LogEvent::new(LogLevel::Warn, "net.Client", "retrying")
            .with_throwable(Throwable::from_message("timeout"));
        let line = formatter.format(&event);
        assert!(line.ends_with(" Client [WARN] retrying timeout"), "{}", line);
    }

    #[test]
    fn test_date_directive() {
        use chrono::TimeZone;
        let at = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let formatter = PatternFormatter::new("%d{yyyy-MM-dd HH:mm:ss} %d %m");
        let event = LogEvent::new(LogLevel::Info, "t", "m").with_timestamp(at);
        assert_eq!(formatter.format(&event), "2024-03-09 07:05:01 07:05:01,000 m");
    }
}
