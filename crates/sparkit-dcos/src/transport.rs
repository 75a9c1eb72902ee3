use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use sparkit_core::{SubmissionError, SubmitTransport};
use sparkit_model::JobHandle;
use tracing::{debug, error};

use crate::cli::DcosCli;

static SUBMISSION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Submission id: (\S+)").expect("submission id pattern")
});

/// Submits through the `spark` CLI subcommand against the framework's dispatcher.
#[derive(Clone)]
pub struct DcosSparkTransport {
    cli: DcosCli,
}

impl DcosSparkTransport {
    pub fn new(cli: DcosCli) -> Self {
        Self { cli }
    }
}

fn submission_id(stdout: &str) -> Option<&str> {
    SUBMISSION_ID
        .captures(stdout)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[async_trait]
impl SubmitTransport for DcosSparkTransport {
    async fn dispatch(
        &self,
        service_name: &str,
        submit_args: &str,
    ) -> Result<JobHandle, SubmissionError> {
        let cmd = self.cli.dcos([
            "--log-level=DEBUG".to_string(),
            "spark".to_string(),
            "--verbose".to_string(),
            format!("--name={service_name}"),
            "run".to_string(),
            format!("--submit-args={submit_args}"),
        ]);

        let out = self
            .cli
            .exec(&cmd)
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        debug!(target: "sparkit.dcos.submit", stdout = %out.stdout, "spark run finished");

        match submission_id(&out.stdout) {
            Some(id) => Ok(JobHandle::from(id)),
            None => {
                error!(target: "sparkit.dcos.submit", stderr = %out.stderr, "no submission id in output");
                Err(SubmissionError::MalformedResponse(out.stdout))
            }
        }
    }
}
