use crate::ring::{RingBuffer, RingBufferError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use thiserror::Error;

/// Lines kept in memory when no explicit tail length is configured.
pub const DEFAULT_RETAINED_LINES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// JSON-line logger for the consensus pipeline.
///
/// Every accepted record is kept in a bounded tail (oldest lines fall off) and, when a sink
/// is attached, written through to it as it happens. The replay binary attaches stderr.
pub struct JsonLineLogger {
    threshold: LogLevel,
    tail: RingBuffer<String>,
    sink: Option<Box<dyn Write + Send>>,
}

impl JsonLineLogger {
    pub fn new(retained_lines: usize) -> Result<Self, LoggingError> {
        Ok(Self {
            threshold: LogLevel::Info,
            tail: RingBuffer::new(retained_lines)?,
            sink: None,
        })
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.threshold = level;
        self
    }

    /// Streams every accepted line to `sink` in addition to the in-memory tail.
    pub fn with_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn level(&self) -> LogLevel {
        self.threshold
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.threshold = level;
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    /// Records `message` against the batch it concerns.
    ///
    /// The line lands in the tail even when the sink write fails; the sink error is returned.
    pub fn log(
        &mut self,
        ts_ms: u64,
        level: LogLevel,
        module: &str,
        batch_seq: u64,
        message: &str,
    ) -> Result<(), LoggingError> {
        if !self.enabled(level) {
            return Ok(());
        }
        let level_label = level.to_string();
        let line = serde_json::to_string(&LogRecord {
            ts: ts_ms,
            level: &level_label,
            module,
            batch_seq,
            message,
        })?;
        let written = match self.sink.as_mut() {
            Some(sink) => writeln!(sink, "{line}").and_then(|()| sink.flush()),
            None => Ok(()),
        };
        self.tail.push(line);
        written.map_err(LoggingError::Sink)
    }

    /// Retained lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.tail.iter()
    }

    pub fn retained(&self) -> usize {
        self.tail.len()
    }

    pub fn retention(&self) -> usize {
        self.tail.capacity()
    }
}

impl fmt::Debug for JsonLineLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLineLogger")
            .field("threshold", &self.threshold)
            .field("retained", &self.tail.len())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log tail: {0}")]
    Retention(#[from] RingBufferError),
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write log line: {0}")]
    Sink(std::io::Error),
}

#[derive(Serialize)]
struct LogRecord<'a> {
    ts: u64,
    level: &'a str,
    module: &'a str,
    batch_seq: u64,
    message: &'a str,
}
