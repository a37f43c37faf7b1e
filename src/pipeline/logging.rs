use crate::result::Result;
use chrono::{DateTime, Local};
use colored::{Color, Colorize};
use smol_str::SmolStr;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a [`LogEntry`].
///
/// Labels outside the four known levels are kept as [`Level::Other`] and
/// rendered without color instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
    Other(SmolStr),
}

impl Level {
    pub fn as_str(&self) -> &str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
            Level::Other(label) => label.as_str(),
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Level::Info => Some(Color::Green),
            Level::Warn => Some(Color::Yellow),
            Level::Error => Some(Color::Red),
            Level::Debug => Some(Color::Cyan),
            Level::Other(_) => None,
        }
    }
}

impl From<&str> for Level {
    fn from(label: &str) -> Self {
        match label.to_ascii_uppercase().as_str() {
            "INFO" => Level::Info,
            "WARN" => Level::Warn,
            "ERROR" => Level::Error,
            "DEBUG" => Level::Debug,
            _ => Level::Other(label.into()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the run log. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct LogEntry {
    timestamp: DateTime<Local>,
    level: Level,
    message: String,
}

impl LogEntry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(Local::now(), level, message)
    }

    pub fn at(timestamp: DateTime<Local>, level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}]: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }
}

struct Sinks {
    console: Box<dyn Write + Send>,
    file: Box<dyn Write + Send>,
}

/** Dual-sink run log shared by the runner and every step
 *
 * # Behaviour
 * - Each entry goes to the console first, then to the log file
 * - Both sinks are flushed before `write_log` returns
 * - Console lines are colored by level, file lines never are
 * - DEBUG entries are dropped from both sinks unless verbose mode is on
 *
 * # Notes
 * - A failing sink is reported through the `log` facade and never aborts
 *   the pipeline
 * - Owned by the run context, so separate runs never share a file handle
 */
pub struct RunLog {
    sinks: Mutex<Sinks>,
    color: bool,
    verbose: bool,
}

impl RunLog {
    /// Opens `path` in append mode (creating parent directories) with stdout
    /// as the console sink. Colors are used only when stdout is a terminal.
    pub fn open(path: &Path, verbose: bool) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self::with_sinks(
            Box::new(io::stdout()),
            Box::new(file),
            // piped output gets plain text, same as the file
            io::stdout().is_terminal(),
            verbose,
        ))
    }

    pub fn with_sinks(
        console: Box<dyn Write + Send>,
        file: Box<dyn Write + Send>,
        color: bool,
        verbose: bool,
    ) -> Self {
        Self {
            sinks: Mutex::new(Sinks { console, file }),
            color,
            verbose,
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn write_log(&self, level: impl Into<Level>, message: impl Into<String>) {
        let level = level.into();
        // dropped before either sink so console and file stay identical
        if level == Level::Debug && !self.verbose {
            return;
        }

        self.write_entry(&LogEntry::new(level, message));
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        let line = entry.to_string();
        let mut sinks = self.sinks.lock().unwrap_or_else(PoisonError::into_inner);

        let console_line = match entry.level().color() {
            Some(color) if self.color => line.color(color).to_string(),
            _ => line.clone(),
        };

        if let Err(e) = write_line(&mut sinks.console, &console_line) {
            log::warn!("Failed to write log entry to console: {}", e);
        }

        if let Err(e) = write_line(&mut sinks.file, &line) {
            log::warn!("Failed to write log entry to log file: {}", e);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.write_log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.write_log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.write_log(Level::Error, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.write_log(Level::Debug, message);
    }
}

fn write_line(sink: &mut Box<dyn Write + Send>, line: &str) -> io::Result<()> {
    writeln!(sink, "{}", line)?;
    sink.flush()
}

/// Renders a step duration as `HH:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
