use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?} (expected text or json)")]
    InvalidFormat(String),
    #[error("a global subscriber is already installed")]
    AlreadyInitialized,
    #[error("cannot install subscriber: {0}")]
    InitializationFailed(String),
    #[error("invalid log filter {0:?}")]
    InvalidLogLevel(String),
}
