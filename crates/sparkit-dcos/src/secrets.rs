use async_trait::async_trait;
use sparkit_core::{CollaboratorError, SecretStore, SecretValue};
use tracing::info;

use crate::cli::DcosCli;

const WHO: &str = "secret store";

/// `dcos security secrets` (enterprise CLI).
#[derive(Clone)]
pub struct DcosSecretStore {
    cli: DcosCli,
}

impl DcosSecretStore {
    pub fn new(cli: DcosCli) -> Self {
        Self { cli }
    }
}

fn absolute(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

#[async_trait]
impl SecretStore for DcosSecretStore {
    async fn create(&self, path: &str, value: &SecretValue) -> Result<(), CollaboratorError> {
        let path = absolute(path);
        let mut cmd = self.cli.dcos(["security", "secrets", "create", path.as_str()]);
        cmd = match value {
            SecretValue::Literal(v) => cmd.arg("--value").arg(v.as_str()).redacting(v.as_str()),
            SecretValue::File(f) => cmd.arg("--value-file").arg(f.display().to_string()),
        };

        self.cli.stdout(&cmd).await.map_err(|e| e.by(WHO))?;
        info!(target: "sparkit.dcos.secrets", %path, "secret created");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), CollaboratorError> {
        let path = absolute(path);
        self.cli
            .stdout(&self.cli.dcos(["security", "secrets", "delete", path.as_str()]))
            .await
            .map_err(|e| e.by(WHO))?;
        info!(target: "sparkit.dcos.secrets", %path, "secret deleted");
        Ok(())
    }
}
