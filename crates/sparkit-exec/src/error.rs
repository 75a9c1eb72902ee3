use std::time::Duration;

use thiserror::Error;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("spawn `{program}` failed: {reason}")]
    Spawn { program: String, reason: String },
    #[error("`{program}` exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },
    #[error("`{program}` killed by signal")]
    KilledBySignal { program: String },
    #[error("`{program}` timed out after {after:?}")]
    TimedOut { program: String, after: Duration },
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}
