use std::io::Write;

use async_trait::async_trait;
use reqwest::StatusCode;
use sparkit_core::{CollaboratorError, ServiceManager, ServiceOptions, WaitConfig, poll_until};
use tracing::{debug, info};

use crate::{cli::DcosCli, errors::DcosError};

const WHO: &str = "service manager";

/// Installs the framework package through the catalogue.
#[derive(Clone)]
pub struct DcosServiceManager {
    cli: DcosCli,
    http: reqwest::Client,
    wait: WaitConfig,
}

impl DcosServiceManager {
    pub fn new(cli: DcosCli, wait: WaitConfig) -> Self {
        Self {
            cli,
            http: reqwest::Client::new(),
            wait,
        }
    }

    async fn install_package(&self, options: &ServiceOptions) -> Result<(), DcosError> {
        let package = &self.cli.config().package;
        let mut args = vec![
            "package".to_string(),
            "install".to_string(),
            package.clone(),
            "--yes".to_string(),
        ];

        // Kept alive until the CLI has read it.
        let mut options_file = None;
        if !options.is_empty() {
            let mut file = tempfile::Builder::new()
                .prefix("sparkit-options-")
                .suffix(".json")
                .tempfile()?;
            let doc = serde_json::to_vec(&options.options)
                .map_err(|e| DcosError::InvalidResponse(e.to_string()))?;
            file.write_all(&doc)?;
            file.flush()?;
            args.push(format!("--options={}", file.path().display()));
            options_file = Some(file);
        }

        self.cli.stdout(&self.cli.dcos(args)).await?;
        drop(options_file);

        self.cli
            .stdout(&self.cli.dcos(["package", "install", package.as_str(), "--cli", "--yes"]))
            .await?;
        Ok(())
    }

    /// `<core.dcos_url>/service/<name>/`
    async fn service_url(&self, service_name: &str) -> Result<String, DcosError> {
        let base = self.cli.config_value("core.dcos_url").await?;
        Ok(format!(
            "{}/service/{}/",
            base.trim_end_matches('/'),
            service_name.trim_start_matches('/')
        ))
    }

    async fn probe(&self, url: &str, token: &str) -> Option<()> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("token={token}"))
            .send()
            .await;
        match resp {
            Ok(r) if r.status() == StatusCode::OK => Some(()),
            Ok(r) => {
                debug!(target: "sparkit.dcos.service", %url, status = %r.status(), "service not ready");
                None
            }
            Err(e) => {
                debug!(target: "sparkit.dcos.service", %url, "service unreachable: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl ServiceManager for DcosServiceManager {
    async fn install(&self, options: &ServiceOptions) -> Result<(), CollaboratorError> {
        info!(target: "sparkit.dcos.service", service = %options.service_name, "installing package");
        self.install_package(options).await.map_err(|e| e.by(WHO))
    }

    async fn wait_ready(&self, service_name: &str) -> Result<(), CollaboratorError> {
        let url = self.service_url(service_name).await.map_err(|e| e.by(WHO))?;
        let token = self
            .cli
            .config_value("core.dcos_acs_token")
            .await
            .map_err(|e| e.by(WHO))?;

        info!(target: "sparkit.dcos.service", %url, "waiting for service");
        let ready = poll_until(self.wait.poll_interval, self.wait.service_timeout, || async {
            Ok::<_, DcosError>(self.probe(&url, &token).await)
        })
        .await
        .map_err(|e| e.by(WHO))?;

        ready.ok_or_else(|| DcosError::NotReady(service_name.to_string()).by(WHO))
    }

    async fn uninstall(&self, service_name: &str) -> Result<(), CollaboratorError> {
        info!(target: "sparkit.dcos.service", service = %service_name, "uninstalling package");
        let app_id = format!("--app-id={service_name}");
        let package = self.cli.config().package.as_str();
        self.cli
            .stdout(&self.cli.dcos(["package", "uninstall", package, app_id.as_str(), "--yes"]))
            .await
            .map(drop)
            .map_err(|e| e.by(WHO))
    }
}
