//! Shared logging utilities for Driftwatch binaries.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "driftwatch=info,driftwatch_core=info,driftwatch_report=info";
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration for a Driftwatch binary.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a size-capped file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer = SharedFileWriter::new(log_dir, config.app_name)
        .context("Failed to initialize log writer")?;

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// Get the Driftwatch home directory: ~/.driftwatch
pub fn driftwatch_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("DRIFTWATCH_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .map(|home| home.join(".driftwatch"))
        .unwrap_or_else(|| PathBuf::from(".driftwatch"))
}

/// Get the logs directory: ~/.driftwatch/logs
pub fn logs_dir() -> PathBuf {
    driftwatch_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Append-only log file with a single size-triggered rollover to `<app>.log.1`.
struct CappedFileAppender {
    dir: PathBuf,
    base_name: String,
    max_size: u64,
    file: File,
    current_size: u64,
}

impl CappedFileAppender {
    fn new(dir: PathBuf, base_name: &str, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let base_name = sanitize_name(base_name);
        let path = dir.join(format!("{}.log", base_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let current_size = file.metadata()?.len();
        let mut appender = Self { dir, base_name, max_size, file, current_size };
        if appender.current_size > appender.max_size {
            appender.rotate()?;
        }
        Ok(appender)
    }

    fn current_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base_name))
    }

    fn rotate(&mut self) -> io::Result<()> {
        let _ = self.file.flush();
        let current = self.current_path();
        if current.exists() {
            fs::rename(&current, self.dir.join(format!("{}.log.1", self.base_name)))?;
        }
        self.file = OpenOptions::new().create(true).append(true).open(&current)?;
        self.current_size = 0;
        Ok(())
    }
}

impl Write for CappedFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.current_size + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }
        let bytes = self.file.write(buf)?;
        self.current_size += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    inner: Arc<Mutex<CappedFileAppender>>,
}

impl SharedFileWriter {
    fn new(dir: PathBuf, base_name: &str) -> Result<Self> {
        let appender = CappedFileAppender::new(dir, base_name, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {}", base_name))?;
        Ok(Self { inner: Arc::new(Mutex::new(appender)) })
    }
}

struct SharedFileWriterGuard {
    inner: Arc<Mutex<CappedFileAppender>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileWriterGuard { inner: Arc::clone(&self.inner) }
    }
}

impl Write for SharedFileWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_path_characters() {
        assert_eq!(sanitize_name("drift/watch check"), "drift_watch_check");
        assert_eq!(sanitize_name("driftwatch"), "driftwatch");
    }

    #[test]
    fn appender_rotates_when_over_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut appender =
            CappedFileAppender::new(dir.path().to_path_buf(), "test", 16).unwrap();
        appender.write_all(b"0123456789abcdef").unwrap();
        appender.write_all(b"next").unwrap();
        appender.flush().unwrap();

        assert!(dir.path().join("test.log.1").exists());
        let current = fs::read_to_string(dir.path().join("test.log")).unwrap();
        assert_eq!(current, "next");
    }
}
