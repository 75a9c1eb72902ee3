use serde::{Deserialize, Serialize};

use crate::KeyValue;

/// What a scenario expects to observe once its job has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedOutcome {
    /// Substring that must appear in the driver's stdout.
    pub output: String,
    /// Network attachment the driver and executors must report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkExpectation>,
}

impl ExpectedOutcome {
    pub fn output(expected: impl Into<String>) -> Self {
        Self {
            output: expected.into(),
            network: None,
        }
    }

    pub fn with_network<I, L>(mut self, name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<KeyValue>,
    {
        self.network = Some(NetworkExpectation {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// Expected first network attachment of a task: exact name, labels in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkExpectation {
    pub name: String,
    #[serde(default)]
    pub labels: Vec<KeyValue>,
}
