//! Logger construction.
//!
//! The logger is built explicitly once at startup and installed as the `log` backend. Every line
//! reads `[bionicreadformatter]: <timestamp> - <message>` and goes to standard error as well as
//! to a log file inside the configured log directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::error::{BionicError, Result};

/// Name that prefixes every log line and names the log file.
pub const LOGGER_NAME: &str = "bionicreadformatter";

const TIMESTAMP_FORMAT: &str = "%y-%m-%d %H:%M:%S";

/// Path of the log file inside `log_dir`.
pub fn log_file_path(log_dir: impl AsRef<Path>) -> PathBuf {
    log_dir.as_ref().join(format!("{LOGGER_NAME}.log"))
}

/// Formats one log line without the trailing newline.
pub fn format_line(timestamp: &str, message: &std::fmt::Arguments<'_>) -> String {
    format!("[{LOGGER_NAME}]: {timestamp} - {message}")
}

/// Copies everything written to standard error and to a file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Builds the logger writing to standard error and to `{log_dir}/bionicreadformatter.log`.
///
/// The level defaults to `info` and follows `RUST_LOG` when set.
pub fn build_logger(log_dir: impl AsRef<Path>) -> Result<env_logger::Logger> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)
        .map_err(|err| BionicError::Logging(format!("{}: {}", log_dir.display(), err)))?;

    let path = log_file_path(log_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| BionicError::Logging(format!("{}: {}", path.display(), err)))?;

    let logger = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
            writeln!(buf, "{}", format_line(&timestamp, record.args()))
        })
        .target(Target::Pipe(Box::new(TeeWriter { file })))
        .build();

    Ok(logger)
}

/// Builds the logger and installs it as the process-wide `log` backend.
pub fn init(log_dir: impl AsRef<Path>) -> Result<()> {
    let logger = build_logger(log_dir)?;
    let max_level: LevelFilter = logger.filter();
    log::set_boxed_logger(Box::new(logger))
        .map_err(|err| BionicError::Logging(err.to_string()))?;
    log::set_max_level(max_level);
    Ok(())
}
