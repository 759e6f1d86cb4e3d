//! Log writer module
//!
//! Fans each record out to the console and the two append-only files.
//! The error file only receives `error` records; the combined file receives
//! everything that passes the configured level.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use super::format::{LogLevel, LogRecord};
use crate::config::LoggingConfig;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Thread-safe log writer
pub struct LogWriter {
    service: String,
    threshold: LogLevel,
    console: bool,
    /// Errors-only sink
    error: Option<Mutex<File>>,
    /// All-levels sink
    combined: Option<Mutex<File>>,
}

impl LogWriter {
    fn new(config: &LoggingConfig) -> io::Result<Self> {
        let threshold = LogLevel::parse(&config.level).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Unknown log level: '{}'", config.level),
            )
        })?;

        Ok(Self {
            service: config.service.clone(),
            threshold,
            console: config.console,
            error: open_optional(config.error_log_file.as_deref())?,
            combined: open_optional(config.combined_log_file.as_deref())?,
        })
    }

    pub fn write(&self, level: LogLevel, message: &str) {
        if !level.passes(self.threshold) {
            return;
        }
        let record = LogRecord::new(level, message, &self.service);

        if self.console {
            write_console(&record);
        }

        if self.error.is_none() && self.combined.is_none() {
            return;
        }
        let line = record.to_json_line();
        if level == LogLevel::Error {
            if let Some(file) = &self.error {
                append_line(file, &line);
            }
        }
        if let Some(file) = &self.combined {
            append_line(file, &line);
        }
    }
}

/// Console output: errors and warnings go to stderr
pub fn write_console(record: &LogRecord<'_>) {
    match record.level {
        LogLevel::Error | LogLevel::Warn => eprintln!("{}", record.to_console_line()),
        LogLevel::Info | LogLevel::Debug => println!("{}", record.to_console_line()),
    }
}

fn open_optional(path: Option<&str>) -> io::Result<Option<Mutex<File>>> {
    path.map(|p| open_log_file(p).map(Mutex::new)).transpose()
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn append_line(file: &Mutex<File>, line: &str) {
    if let Ok(mut f) = file.lock() {
        let _ = writeln!(f, "{line}");
    }
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    let writer = LogWriter::new(config)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
