//! Assertions on a job's side effects: captured output and task metadata.

use std::sync::Arc;

use sparkit_model::{JobHandle, KeyValue, NetworkExpectation, TaskInfo};
use tracing::{debug, error};

use crate::{
    api::{ClusterQuery, LogStream},
    error::{AssertionFailure, CoreError},
};

/// Checks a finished job's stdout.
#[derive(Clone)]
pub struct OutputVerifier {
    query: Arc<dyn ClusterQuery>,
}

impl OutputVerifier {
    pub fn new(query: Arc<dyn ClusterQuery>) -> Self {
        Self { query }
    }

    /// Whether the job's stdout contains `expected`.
    ///
    /// A missing log is [`CoreError::OutputNotFound`]; a log without the
    /// substring is `Ok(false)`.
    pub async fn check_output(&self, handle: &JobHandle, expected: &str) -> Result<bool, CoreError> {
        let stdout = self.stdout(handle).await?;
        let found = stdout.contains(expected);
        debug!(target: "sparkit.core.verify", job = %handle, found, "checked output");
        Ok(found)
    }

    /// Like [`check_output`](Self::check_output), but a missing substring is an
    /// [`AssertionFailure`]. Both streams are logged before failing.
    pub async fn assert_output(&self, handle: &JobHandle, expected: &str) -> Result<(), CoreError> {
        let stdout = self.stdout(handle).await?;
        if stdout.contains(expected) {
            return Ok(());
        }

        let stderr = self
            .query
            .task_log(handle.as_str(), LogStream::Stderr)
            .await?
            .unwrap_or_default();
        error!(target: "sparkit.core.verify", job = %handle, "task stdout: {stdout}");
        error!(target: "sparkit.core.verify", job = %handle, "task stderr: {stderr}");

        Err(AssertionFailure::new(format!("{expected:?} not found in stdout of {handle}")).into())
    }

    async fn stdout(&self, handle: &JobHandle) -> Result<String, CoreError> {
        self.query
            .task_log(handle.as_str(), LogStream::Stdout)
            .await?
            .ok_or_else(|| CoreError::OutputNotFound(handle.clone()))
    }
}

/// Assert the task's first network attachment is `expected_name` with exactly
/// `expected_labels`, in the same order.
pub fn check_network_info(
    task: &TaskInfo,
    expected_name: &str,
    expected_labels: &[KeyValue],
) -> Result<(), AssertionFailure> {
    let network = task.first_network().ok_or_else(|| {
        AssertionFailure::new(format!("task {} has no network attachment", task.id))
    })?;

    let name = network.name.as_deref().unwrap_or_default();
    if name != expected_name {
        return Err(AssertionFailure::new(format!(
            "task {}: network name {name:?}, expected {expected_name:?}",
            task.id
        )));
    }

    let labels = network.label_list();
    if labels.len() != expected_labels.len() {
        return Err(AssertionFailure::new(format!(
            "task {}: {} network labels, expected {}",
            task.id,
            labels.len(),
            expected_labels.len()
        )));
    }

    for (i, (got, want)) in labels.iter().zip(expected_labels).enumerate() {
        if got != want {
            return Err(AssertionFailure::new(format!(
                "task {}: label #{i} is {}={}, expected {}={}",
                task.id,
                got.key(),
                got.value(),
                want.key(),
                want.value()
            )));
        }
    }
    Ok(())
}

/// [`check_network_info`] against a declared expectation.
#[inline]
pub fn check_network(task: &TaskInfo, expected: &NetworkExpectation) -> Result<(), AssertionFailure> {
    check_network_info(task, &expected.name, &expected.labels)
}
