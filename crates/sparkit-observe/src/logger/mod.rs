mod config;
mod error;
mod format;
mod log;

pub use config::{LogSink, LoggerConfig};
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global subscriber described by `cfg`.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    log::install(cfg)
}

/// Like [`logger_init`], but a subscriber installed earlier (another test, the
/// runner binary) is not an error.
pub fn logger_init_once(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match logger_init(cfg) {
        Err(LoggerError::AlreadyInitialized) => Ok(()),
        other => other,
    }
}
