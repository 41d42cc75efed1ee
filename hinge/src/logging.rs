//! Logging bootstrap.
//!
//! The engines log through the `log` facade. Terminal hosts own stdout, so
//! the sink is a file.

use std::fs::File;
use std::path::Path;
use std::sync::Once;

use simplelog::{Config, LevelFilter, TestLogger, WriteLogger};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("a logger is already installed")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

/// Install a `WriteLogger` that writes everything at `level` or above to `path`.
pub fn init_file_logger(path: impl AsRef<Path>, level: LevelFilter) -> Result<(), LoggingError> {
    let file = File::create(path)?;
    WriteLogger::init(level, Config::default(), file)?;
    Ok(())
}

/// Install a test logger once per process. Later calls do nothing.
pub fn init_test_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    });
}
