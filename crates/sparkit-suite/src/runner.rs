use std::{panic::AssertUnwindSafe, time::Instant};

use futures::FutureExt;
use sparkit_core::{CoreError, Harness, ServiceOptions, ServiceScope};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{error, info, warn};

use crate::{
    config::SuiteConfig,
    report::{Outcome, Report, ScenarioReport},
    scenario::{ClusterEnv, Marker, Scenario, ScenarioError, SuiteContext},
    scenarios,
};

/// Which catalogue entries to run. Empty filters select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub markers: Vec<Marker>,
    pub names: Vec<String>,
}

impl Selection {
    /// A scenario is selected if it carries any requested marker and is any
    /// requested name.
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let by_marker = self.markers.is_empty() || self.markers.iter().any(|&m| scenario.has_marker(m));
        let by_name = self.names.is_empty() || self.names.iter().any(|n| n == scenario.name);
        by_marker && by_name
    }

    /// Requested names that are not in the catalogue.
    pub fn unknown_names(&self) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| scenarios::find(n).is_none())
            .collect()
    }
}

/// The suite could not get to the point of running scenarios.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("suite setup failed: {0}")]
    Setup(#[source] CoreError),
}

/// Runs scenarios against one harness, sharing one framework install.
pub struct SuiteRunner {
    harness: Harness,
    config: SuiteConfig,
}

impl SuiteRunner {
    pub fn new(harness: Harness, config: SuiteConfig) -> Self {
        Self { harness, config }
    }

    /// Install the framework, run every selected scenario in order, uninstall.
    ///
    /// Scenario failures end up in the [`Report`]; only a failed setup is an
    /// error.
    pub async fn run(
        &self,
        catalogue: &[Scenario],
        selection: &Selection,
    ) -> Result<Report, SuiteError> {
        let started_at = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        let mut report = Report::new(started_at);

        let selected: Vec<&Scenario> = catalogue.iter().filter(|s| selection.matches(s)).collect();
        info!(target: "sparkit.suite", run_id = %report.run_id, selected = selected.len(), "suite starting");
        if selected.is_empty() {
            return Ok(report);
        }

        let scope = ServiceScope::setup(self.harness.services().clone(), ServiceOptions::default())
            .await
            .map_err(|e| SuiteError::Setup(e.into()))?;

        let ctx = match self.prepare().await {
            Ok(ctx) => ctx,
            Err(e) => {
                if let Err(down) = scope.teardown().await {
                    error!(target: "sparkit.suite", "teardown after failed setup: {down}");
                }
                return Err(SuiteError::Setup(e));
            }
        };

        for scenario in selected {
            let entry = run_one(&ctx, scenario).await;
            report.scenarios.push(entry);
        }

        if let Err(e) = scope.teardown().await {
            error!(target: "sparkit.suite", "teardown failed: {e}");
            report.teardown_error = Some(e.to_string());
        }

        info!(target: "sparkit.suite", run_id = %report.run_id, "{}", report.summary());
        Ok(report)
    }

    /// Shared setup after the install: scala jar, enterprise CLI, cluster facts.
    async fn prepare(&self) -> Result<SuiteContext, CoreError> {
        let h = &self.harness;
        let scala_jar_url = h.upload(&self.config.scala_test_jar).await?;

        let install_cli: Vec<String> = ["package", "install", "--cli", "dcos-enterprise-cli", "--yes"]
            .into_iter()
            .map(String::from)
            .collect();
        h.query().run_command(&install_cli).await?;

        let version = h.query().cluster_version().await?;
        let cluster = ClusterEnv {
            version,
            enterprise: self.config.enterprise,
        };
        info!(target: "sparkit.suite", %version, enterprise = cluster.enterprise, "cluster ready");

        Ok(SuiteContext {
            harness: h.clone(),
            config: self.config.clone(),
            cluster,
            scala_jar_url,
        })
    }
}

/// Run one scenario and classify how it ended.
async fn run_one(ctx: &SuiteContext, scenario: &Scenario) -> ScenarioReport {
    let started = Instant::now();

    let outcome = if let Some(reason) = scenario.requirement.unmet(&ctx.cluster) {
        info!(target: "sparkit.suite", scenario = scenario.name, %reason, "skipped");
        Outcome::Skipped(reason)
    } else {
        info!(target: "sparkit.suite", scenario = scenario.name, "running");
        match AssertUnwindSafe((scenario.body)(ctx)).catch_unwind().await {
            Ok(Ok(())) => Outcome::Pass,
            Ok(Err(e)) => classify(scenario.name, e),
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(target: "sparkit.suite", scenario = scenario.name, "panicked: {msg}");
                Outcome::Error(format!("panicked: {msg}"))
            }
        }
    };

    info!(target: "sparkit.suite", scenario = scenario.name, outcome = outcome.label(), "finished");
    ScenarioReport {
        name: scenario.name.to_string(),
        outcome,
        elapsed: started.elapsed(),
    }
}

fn classify(name: &str, err: ScenarioError) -> Outcome {
    if err.is_assertion() {
        warn!(target: "sparkit.suite", scenario = name, "failed: {err}");
        Outcome::Fail(err.to_string())
    } else {
        error!(target: "sparkit.suite", scenario = name, "error: {err}");
        Outcome::Error(err.to_string())
    }
}
