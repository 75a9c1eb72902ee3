use async_trait::async_trait;
use serde::Deserialize;
use sparkit_core::{ClusterQuery, CollaboratorError, LogStream};
use sparkit_exec::ExecError;
use sparkit_model::{ClusterVersion, TaskInfo};
use tracing::debug;

use crate::{cli::DcosCli, errors::DcosError};

const WHO: &str = "cluster query";
const LOG_LINES: &str = "--lines=1000";

/// A framework as listed by `dcos service --json`.
#[derive(Debug, Deserialize)]
struct Framework {
    name: String,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    tasks: Vec<TaskInfo>,
}

/// Cluster state read through the `dcos` CLI.
#[derive(Clone)]
pub struct DcosClusterQuery {
    cli: DcosCli,
}

impl DcosClusterQuery {
    pub fn new(cli: DcosCli) -> Self {
        Self { cli }
    }

    async fn find_task(&self, task_id: &str, completed: bool) -> Result<Option<TaskInfo>, DcosError> {
        let mut args = vec!["task", "--json"];
        if completed {
            args.push("--completed");
        }
        args.push(task_id);

        let out = self.cli.stdout(&self.cli.dcos(args)).await?;
        let tasks: Vec<TaskInfo> =
            serde_json::from_str(&out).map_err(|e| DcosError::InvalidResponse(e.to_string()))?;

        // The CLI filters by prefix; prefer the exact id.
        let mut first = None;
        for task in tasks {
            if task.id == task_id {
                return Ok(Some(task));
            }
            first.get_or_insert(task);
        }
        Ok(first)
    }

    async fn framework_tasks(&self, service: &str) -> Result<Vec<TaskInfo>, DcosError> {
        let out = self
            .cli
            .stdout(&self.cli.dcos(["service", "--json", "--inactive"]))
            .await?;
        let frameworks: Vec<Framework> =
            serde_json::from_str(&out).map_err(|e| DcosError::InvalidResponse(e.to_string()))?;

        let mut matching: Vec<Framework> =
            frameworks.into_iter().filter(|f| f.name == service).collect();
        matching.sort_by_key(|f| !f.active);
        Ok(matching.into_iter().next().map(|f| f.tasks).unwrap_or_default())
    }

    async fn log(&self, task_id: &str, stream: LogStream) -> Result<Option<String>, DcosError> {
        let mut args = vec!["task", "log", "--completed", LOG_LINES, task_id];
        if stream == LogStream::Stderr {
            args.push(stream.as_str());
        }

        match self.cli.exec(&self.cli.dcos(args)).await {
            Ok(out) => Ok(Some(out.stdout)),
            Err(DcosError::Exec(ExecError::NonZeroExit { stderr, .. })) => {
                debug!(target: "sparkit.dcos.query", task = task_id, stream = stream.as_str(), "no log: {}", stderr.trim());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn version(&self) -> Result<ClusterVersion, DcosError> {
        let out = self.cli.stdout(&self.cli.dcos(["--version"])).await?;
        parse_version(&out)
    }
}

/// Cluster version from the `dcos.version=` line of `dcos --version`.
fn parse_version(out: &str) -> Result<ClusterVersion, DcosError> {
    out.lines()
        .find_map(|l| l.trim().strip_prefix("dcos.version="))
        .ok_or_else(|| DcosError::InvalidResponse(format!("no dcos.version in {out:?}")))?
        .parse()
        .map_err(|e: sparkit_model::ClusterVersionError| DcosError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ClusterQuery for DcosClusterQuery {
    async fn get_task(
        &self,
        task_id: &str,
        include_completed: bool,
    ) -> Result<Option<TaskInfo>, CollaboratorError> {
        self.find_task(task_id, include_completed)
            .await
            .map_err(|e| e.by(WHO))
    }

    async fn service_tasks(&self, service: &str) -> Result<Vec<TaskInfo>, CollaboratorError> {
        self.framework_tasks(service).await.map_err(|e| e.by(WHO))
    }

    async fn task_log(
        &self,
        task_id: &str,
        stream: LogStream,
    ) -> Result<Option<String>, CollaboratorError> {
        self.log(task_id, stream).await.map_err(|e| e.by(WHO))
    }

    async fn run_command(&self, args: &[String]) -> Result<String, CollaboratorError> {
        self.cli
            .stdout(&self.cli.dcos(args.iter().cloned()))
            .await
            .map_err(|e| e.by(WHO))
    }

    async fn auth_token(&self) -> Result<String, CollaboratorError> {
        self.cli
            .config_value("core.dcos_acs_token")
            .await
            .map_err(|e| e.by(WHO))
    }

    async fn cluster_version(&self) -> Result<ClusterVersion, CollaboratorError> {
        self.version().await.map_err(|e| e.by(WHO))
    }
}
