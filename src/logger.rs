//! Custom logging module.
//!
//! This module provides a custom logger implementation that formats log
//! records and hands them to a callback: the terminal UI keeps them in a
//! [`LogBuffer`] for the log pane, the command line writes them to stderr.

use crate::error::AppError;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Most entries kept for the log pane.
///
const LOG_CAPACITY: usize = 500;

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {} {}", timestamp, level_str, record.args())
}

/// Bounded, shared list of formatted log entries.
///
#[derive(Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<String>>>,
}

impl LogBuffer {
    pub fn push(&self, entry: String) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == LOG_CAPACITY {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }
}

type LogCallback = Box<dyn Fn(String) + Send + Sync>;

/// Custom logger that forwards formatted records to a callback
///
pub struct CustomLogger {
    level: LevelFilter,
    log_callback: Arc<Mutex<Option<LogCallback>>>,
}

impl CustomLogger {
    pub fn new(level: LevelFilter) -> Self {
        CustomLogger {
            level,
            log_callback: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_log_callback(&self, callback: LogCallback) {
        if let Ok(mut guard) = self.log_callback.lock() {
            *guard = Some(callback);
        }
        // If lock fails the callback stays unset and records are dropped
    }

    /// Install as the global logger.
    ///
    pub fn install(self) -> Result<(), AppError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).map_err(|e| AppError::Logger(e.to_string()))?;
        log::set_max_level(level);
        Ok(())
    }

    /// Install a logger feeding `buffer`.
    ///
    pub fn install_buffered(level: LevelFilter, buffer: LogBuffer) -> Result<(), AppError> {
        let logger = CustomLogger::new(level);
        logger.set_log_callback(Box::new(move |entry| buffer.push(entry)));
        logger.install()
    }

    /// Install a logger writing to stderr.
    ///
    pub fn install_stderr(level: LevelFilter) -> Result<(), AppError> {
        let logger = CustomLogger::new(level);
        logger.set_log_callback(Box::new(|entry| eprintln!("{}", entry)));
        logger.install()
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
            && !metadata.target().starts_with("hyper")
            && !metadata.target().starts_with("reqwest")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(callback) = self.log_callback.lock() {
                if let Some(ref cb) = *callback {
                    cb(format_log(record));
                }
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(level: Level, target: &'static str) -> bool {
        let logger = CustomLogger::new(LevelFilter::Info);
        let metadata = Metadata::builder().level(level).target(target).build();
        logger.enabled(&metadata)
    }

    #[test]
    fn level_filter() {
        assert!(record_at(Level::Error, "tasky"));
        assert!(record_at(Level::Info, "tasky"));
        assert!(!record_at(Level::Debug, "tasky"));
    }

    #[test]
    fn http_internals_are_muted() {
        assert!(!record_at(Level::Error, "hyper::proto"));
        assert!(!record_at(Level::Info, "reqwest::connect"));
    }

    #[test]
    fn callback_receives_formatted_record() {
        let buffer = LogBuffer::default();
        let logger = CustomLogger::new(LevelFilter::Trace);
        let sink = buffer.clone();
        logger.set_log_callback(Box::new(move |entry| sink.push(entry)));

        logger.log(
            &Record::builder()
                .args(format_args!("Loaded {} tasks", 3))
                .level(Level::Warn)
                .target("tasky")
                .build(),
        );

        let entries = buffer.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("WARN Loaded 3 tasks"));
    }

    #[test]
    fn buffer_is_bounded() {
        let buffer = LogBuffer::default();
        for i in 0..LOG_CAPACITY + 5 {
            buffer.push(i.to_string());
        }
        let entries = buffer.entries();
        assert_eq!(entries.len(), LOG_CAPACITY);
        assert_eq!(entries[0], "5");
    }
}
