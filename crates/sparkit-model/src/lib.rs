//! Data model shared by the harness crates.
//!
//! Everything here is plain data: job specifications built by scenarios,
//! handles returned by submission, and the task descriptions the cluster
//! reports back.

mod domain;
pub use domain::*;
