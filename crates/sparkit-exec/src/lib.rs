//! Running external programs (`dcos`, `aws`) with captured output.

mod error;
pub use error::{ExecError, ExecResult};

mod util;

pub mod proc;
pub use proc::{CommandRunner, ProcConfig, ProcOutput, ProcRunner};
