//! Pipeline progress logging.
//!
//! Every entry is echoed to stderr (unless echo is switched off) and
//! broadcast to any subscriber, e.g. a test or an embedding tool that
//! wants to show progress. Entries may carry the [`Step`] that produced
//! them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
}

impl LogLevel {
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => " ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠",
        }
    }
}

/// Pipeline stage an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Load,
    Normalize,
    Count,
    Qualify,
    Catalog,
    Edges,
    NodeColors,
    Render,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Load => "load",
            Step::Normalize => "normalize",
            Step::Count => "count",
            Step::Qualify => "qualify",
            Step::Catalog => "catalog",
            Step::Edges => "edges",
            Step::NodeColors => "node colors",
            Step::Render => "render",
        };
        f.write_str(name)
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
    pub message: String,
    /// Nesting depth, for sub-steps
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, step: None, message: message.into(), indent: 0 }
    }

    pub fn at(mut self, step: Step) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Terminal form: indent, level marker, optional `[step]`, message.
    pub fn render(&self) -> String {
        let indent = "   ".repeat(self.indent as usize);
        match self.step {
            Some(step) => format!("{}  {} [{}] {}", indent, self.level.marker(), step, self.message),
            None => format!("{}  {} {}", indent, self.level.marker(), self.message),
        }
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans log entries out to stderr and to subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
    echo: AtomicBool,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender, echo: AtomicBool::new(true) }
    }

    pub fn log(&self, entry: LogEntry) {
        if self.echo.load(Ordering::Relaxed) {
            eprintln!("{}", entry.render());
        }

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    /// Turn terminal echo on or off; subscribers still receive entries.
    pub fn set_echo(&self, enabled: bool) {
        self.echo.store(enabled, Ordering::Relaxed);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg).with_indent(indent));
}

/// Log a finished pipeline step.
pub fn log_step(step: Step, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg).at(step));
}

/// Log a warning raised while running `step`.
pub fn log_step_warning(step: Step, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg).at(step));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entries() {
        let broadcaster = LogBroadcaster::new();
        broadcaster.set_echo(false);
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Warning, "palette too small").at(Step::Edges).with_indent(1));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.step, Some(Step::Edges));
        assert_eq!(entry.message, "palette too small");
        assert_eq!(entry.indent, 1);
    }

    #[test]
    fn test_log_without_subscribers() {
        let broadcaster = LogBroadcaster::new();
        broadcaster.set_echo(false);
        broadcaster.log(LogEntry::new(LogLevel::Info, "nobody listening"));
    }

    #[test]
    fn test_render() {
        assert_eq!(LogEntry::new(LogLevel::Success, "3 labels").at(Step::Catalog).render(), "  ✓ [catalog] 3 labels");
        assert_eq!(LogEntry::new(LogLevel::Info, "Course1").with_indent(1).render(), "       Course1");
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(LogEntry::new(LogLevel::Success, "done").at(Step::NodeColors)).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["step"], "node_colors");
        assert_eq!(json["indent"], 0);

        let plain = serde_json::to_value(LogEntry::new(LogLevel::Info, "x")).unwrap();
        assert!(plain.get("step").is_none());
    }
}
