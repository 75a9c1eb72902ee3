use std::{fmt, time::Duration};

use serde::Serialize;
use uuid::Uuid;

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    /// An assertion did not hold.
    Fail(String),
    /// Something broke before the assertion could be decided.
    Error(String),
    /// The cluster does not meet the scenario's requirement.
    Skipped(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail(_) => "fail",
            Outcome::Error(_) => "error",
            Outcome::Skipped(_) => "skipped",
        }
    }

    #[inline]
    pub fn is_bad(&self) -> bool {
        matches!(self, Outcome::Fail(_) | Outcome::Error(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("pass"),
            Outcome::Fail(d) | Outcome::Error(d) | Outcome::Skipped(d) => {
                write!(f, "{}: {d}", self.label())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
}

/// Everything one suite run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: Uuid,
    /// RFC 3339 start time.
    pub started_at: String,
    pub scenarios: Vec<ScenarioReport>,
    /// Set when the shared service could not be removed afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<String>,
}

impl Report {
    pub fn new(started_at: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            scenarios: Vec::new(),
            teardown_error: None,
        }
    }

    pub fn count(&self, label: &str) -> usize {
        self.scenarios
            .iter()
            .filter(|s| s.outcome.label() == label)
            .count()
    }

    pub fn outcome_of(&self, name: &str) -> Option<&Outcome> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.outcome)
    }

    /// Something was selected, nothing failed or errored, and teardown went
    /// through. A run that selected no scenario at all is not a success.
    pub fn succeeded(&self) -> bool {
        !self.scenarios.is_empty()
            && self.teardown_error.is_none()
            && !self.scenarios.iter().any(|s| s.outcome.is_bad())
    }

    /// `4 passed, 1 failed, 0 errors, 2 skipped`
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} errors, {} skipped",
            self.count("pass"),
            self.count("fail"),
            self.count("error"),
            self.count("skipped")
        )
    }
}
