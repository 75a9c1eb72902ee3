use std::{path::Path, sync::Arc};

use sparkit_model::{ExpectedOutcome, JobHandle, JobSpec, TaskInfo, TerminalState, UrlScheme};
use tracing::{info, instrument, warn};

use crate::{
    api::{ClusterQuery, Collaborators, ObjectStore, SecretStore, ServiceManager},
    config::{SubmitDefaults, WaitConfig},
    error::{AssertionFailure, CollaboratorError, CoreError, SubmissionError, UploadError},
    submit::Submitter,
    upload::Uploader,
    verify::{OutputVerifier, check_network},
    wait::Waiter,
};

/// One set of collaborators plus the protocol components built over them.
///
/// Scenarios talk to the cluster only through this type.
#[derive(Clone)]
pub struct Harness {
    collaborators: Collaborators,
    submitter: Submitter,
    waiter: Waiter,
    verifier: OutputVerifier,
    uploader: Uploader,
}

impl Harness {
    pub fn new(collaborators: Collaborators, wait: WaitConfig, defaults: SubmitDefaults) -> Self {
        Self {
            submitter: Submitter::new(collaborators.transport.clone(), defaults),
            waiter: Waiter::new(collaborators.query.clone(), wait),
            verifier: OutputVerifier::new(collaborators.query.clone()),
            uploader: Uploader::new(collaborators.store.clone()),
            collaborators,
        }
    }

    pub fn services(&self) -> &Arc<dyn ServiceManager> {
        &self.collaborators.services
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.collaborators.store
    }

    pub fn query(&self) -> &Arc<dyn ClusterQuery> {
        &self.collaborators.query
    }

    pub fn secrets(&self) -> &Arc<dyn SecretStore> {
        &self.collaborators.secrets
    }

    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<String, UploadError> {
        self.uploader.upload(path).await
    }

    pub async fn upload_as(
        &self,
        path: impl AsRef<Path>,
        scheme: UrlScheme,
    ) -> Result<String, UploadError> {
        self.uploader.upload_as(path, scheme).await
    }

    pub async fn submit(&self, spec: &JobSpec) -> Result<JobHandle, SubmissionError> {
        self.submitter.submit(spec).await
    }

    /// [`Waiter::wait_for_executors`] with the configured executor budget.
    pub async fn wait_for_executors(
        &self,
        framework: &str,
        expected: usize,
    ) -> Result<bool, CollaboratorError> {
        let timeout = self.waiter.config().executor_timeout;
        self.waiter.wait_for_executors(framework, expected, timeout).await
    }

    /// [`Waiter::wait_for_terminal`] with the configured completion budget.
    pub async fn wait_for_terminal(
        &self,
        handle: &JobHandle,
    ) -> Result<TerminalState, CollaboratorError> {
        let timeout = self.waiter.config().completion_timeout;
        self.waiter.wait_for_terminal(handle, timeout).await
    }

    pub async fn get_task(
        &self,
        task_id: &str,
        include_completed: bool,
    ) -> Result<Option<TaskInfo>, CollaboratorError> {
        self.collaborators.query.get_task(task_id, include_completed).await
    }

    pub async fn service_tasks(&self, service: &str) -> Result<Vec<TaskInfo>, CollaboratorError> {
        self.collaborators.query.service_tasks(service).await
    }

    /// Wait for the driver of `handle` to stop and assert its stdout contains
    /// `expected`.
    ///
    /// A driver that did not stop in time is [`CoreError::Timeout`]. A failed
    /// driver still has its output checked, so the assertion message shows
    /// what it printed.
    pub async fn await_output(&self, handle: &JobHandle, expected: &str) -> Result<(), CoreError> {
        match self.wait_for_terminal(handle).await? {
            TerminalState::Succeeded => {}
            TerminalState::Failed => {
                warn!(target: "sparkit.core.harness", job = %handle, "driver failed; checking output anyway");
            }
            TerminalState::Timeout => {
                return Err(CoreError::Timeout {
                    what: format!("completion of job {handle}"),
                    after: self.waiter.config().completion_timeout,
                });
            }
        }

        self.verifier.assert_output(handle, expected).await?;
        info!(target: "sparkit.core.harness", job = %handle, "expected output found");
        Ok(())
    }

    /// Submit `spec`, then [`await_output`](Self::await_output).
    #[instrument(level = "debug", skip(self, spec), fields(app = %spec.app_url()))]
    pub async fn run_to_completion(
        &self,
        spec: &JobSpec,
        expected: &str,
    ) -> Result<JobHandle, CoreError> {
        let handle = self.submit(spec).await?;
        self.await_output(&handle, expected).await?;
        Ok(handle)
    }

    /// [`run_to_completion`](Self::run_to_completion), then the network
    /// expectation (if any) against the driver task.
    pub async fn run_expecting(
        &self,
        spec: &JobSpec,
        expected: &ExpectedOutcome,
    ) -> Result<JobHandle, CoreError> {
        let handle = self.run_to_completion(spec, &expected.output).await?;

        if let Some(network) = &expected.network {
            let task = self
                .get_task(handle.as_str(), true)
                .await?
                .ok_or_else(|| AssertionFailure::new(format!("driver task {handle} not found")))?;
            check_network(&task, network)?;
        }
        Ok(handle)
    }
}
