//! Contracts of the external collaborators the protocol talks to.
//!
//! Concrete implementations live outside this crate (the DC/OS adapters, or
//! in-memory fakes in tests); everything here only describes what is needed.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use sparkit_model::{
    ClusterVersion, DEFAULT_SERVICE_NAME, JobHandle, ObjectKey, TaskInfo, UrlScheme,
};

use crate::error::{CollaboratorError, SubmissionError};

/// Installs and removes the framework service.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn install(&self, options: &ServiceOptions) -> Result<(), CollaboratorError>;

    /// Block until the installed service answers.
    async fn wait_ready(&self, service_name: &str) -> Result<(), CollaboratorError>;

    async fn uninstall(&self, service_name: &str) -> Result<(), CollaboratorError>;
}

/// Stores artifacts where the cluster can read them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file; returns its key (the file's base name).
    async fn upload(&self, path: &std::path::Path) -> Result<ObjectKey, CollaboratorError>;

    /// Keys starting with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectKey>, CollaboratorError>;

    fn url_for(&self, key: &str, scheme: UrlScheme) -> String;
}

/// Which captured stream of a task to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStream::Stdout => "stdout",
            LogStream::Stderr => "stderr",
        }
    }
}

/// Read access to cluster state.
#[async_trait]
pub trait ClusterQuery: Send + Sync {
    /// Task by id; `None` when the cluster does not (yet) know it.
    async fn get_task(
        &self,
        task_id: &str,
        include_completed: bool,
    ) -> Result<Option<TaskInfo>, CollaboratorError>;

    /// Active tasks of the framework registered as `service`.
    async fn service_tasks(&self, service: &str) -> Result<Vec<TaskInfo>, CollaboratorError>;

    /// Captured output of a task; `None` when no log exists.
    async fn task_log(
        &self,
        task_id: &str,
        stream: LogStream,
    ) -> Result<Option<String>, CollaboratorError>;

    /// Run an arbitrary cluster CLI command and return its stdout.
    async fn run_command(&self, args: &[String]) -> Result<String, CollaboratorError>;

    async fn auth_token(&self) -> Result<String, CollaboratorError>;

    async fn cluster_version(&self) -> Result<ClusterVersion, CollaboratorError>;
}

/// Value of a secret entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    Literal(String),
    /// Contents are read from this file by the secret store client.
    File(PathBuf),
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn create(&self, path: &str, value: &SecretValue) -> Result<(), CollaboratorError>;
    async fn delete(&self, path: &str) -> Result<(), CollaboratorError>;
}

/// Delivers an assembled submission to the framework's dispatcher.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    /// Submit `submit_args` to `service_name`; returns as soon as the
    /// dispatcher accepted the job.
    async fn dispatch(
        &self,
        service_name: &str,
        submit_args: &str,
    ) -> Result<JobHandle, SubmissionError>;
}

/// Install-time options of the framework service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    pub service_name: String,
    /// Package options document (`{"service": {...}, ...}`).
    pub options: Map<String, Value>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            options: Map::new(),
        }
    }
}

impl ServiceOptions {
    /// Options installing the service under `name` (which may be a group path).
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut opts = Self {
            service_name: name.clone(),
            options: Map::new(),
        };
        if name != DEFAULT_SERVICE_NAME {
            opts = opts.with_service_setting("name", name);
        }
        opts
    }

    /// Set `service.<key>` in the options document.
    pub fn with_service_setting(mut self, key: &str, value: impl Into<Value>) -> Self {
        let service = self
            .options
            .entry("service")
            .or_insert_with(|| json!({}));
        if !service.is_object() {
            *service = json!({});
        }
        if let Some(obj) = service.as_object_mut() {
            obj.insert(key.to_string(), value.into());
        }
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// The full set of collaborators one harness runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub services: Arc<dyn ServiceManager>,
    pub store: Arc<dyn ObjectStore>,
    pub query: Arc<dyn ClusterQuery>,
    pub secrets: Arc<dyn SecretStore>,
    pub transport: Arc<dyn SubmitTransport>,
}
