use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of waiting for a job to finish.
///
/// `Timeout` is an ordinary value: the wait gave up, the remote job may still be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminalState {
    Succeeded,
    Failed,
    Timeout,
}

impl TerminalState {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, TerminalState::Succeeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalState::Succeeded => "succeeded",
            TerminalState::Failed => "failed",
            TerminalState::Timeout => "timeout",
        }
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
