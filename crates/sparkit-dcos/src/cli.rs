use std::sync::Arc;

use sparkit_exec::{CommandRunner, ProcConfig, ProcOutput};
use tracing::debug;

use crate::{config::DcosConfig, errors::DcosError};

/// Thin wrapper running `dcos` / `aws` subcommands with the shared settings.
#[derive(Clone)]
pub struct DcosCli {
    runner: Arc<dyn CommandRunner>,
    cfg: Arc<DcosConfig>,
}

impl DcosCli {
    pub fn new(runner: Arc<dyn CommandRunner>, cfg: DcosConfig) -> Self {
        Self {
            runner,
            cfg: Arc::new(cfg),
        }
    }

    #[inline]
    pub fn config(&self) -> &DcosConfig {
        &self.cfg
    }

    /// `dcos <args>` with the configured redactions.
    pub fn dcos<I, S>(&self, args: I) -> ProcConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command(&self.cfg.cli, args)
    }

    /// `aws <args>` with the configured redactions.
    pub fn aws<I, S>(&self, args: I) -> ProcConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command(&self.cfg.aws, args)
    }

    fn command<I, S>(&self, program: &str, args: I) -> ProcConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg
            .redact
            .iter()
            .fold(ProcConfig::new(program).args(args), |cfg, v| cfg.redacting(v.as_str()))
            .timeout(self.cfg.command_timeout)
    }

    /// Run and return the full captured output.
    pub async fn exec(&self, cfg: &ProcConfig) -> Result<ProcOutput, DcosError> {
        debug!(target: "sparkit.dcos.cli", cmd = %cfg.display(), "running");
        Ok(self.runner.run(cfg).await?)
    }

    /// Run and return stdout; non-zero exit is an error.
    pub async fn stdout(&self, cfg: &ProcConfig) -> Result<String, DcosError> {
        Ok(self.exec(cfg).await?.stdout)
    }

    /// `dcos config show <key>`, trimmed.
    pub async fn config_value(&self, key: &str) -> Result<String, DcosError> {
        let out = self.stdout(&self.dcos(["config", "show", key])).await?;
        Ok(out.trim().to_string())
    }
}
