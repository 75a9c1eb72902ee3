use futures::{FutureExt, future::LocalBoxFuture};
use sparkit_core::{SecretSpec, with_secrets};
use sparkit_model::JobSpec;

use super::PI_OUTPUT;
use crate::scenario::{ScenarioError, SuiteContext};

const SECRET_NAME: &str = "secret";
const SECRET_CONTENTS: &str = "mgummelt";
const SECRET_FILE: &str = "secret_file";

/// A secret mounted into the driver as a file.
pub(super) fn secrets(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let h = &ctx.harness;
        let spec = JobSpec::new(ctx.scala_jar_url.as_str())
            .with_flag(
                "--properties-file",
                ctx.config.resource("secrets-opts.txt").display().to_string(),
            )
            .with_class("SecretsJob")
            .with_args(SECRET_FILE);
        let expected = format!("Contents of file {SECRET_FILE}: {SECRET_CONTENTS}");

        let secrets = [SecretSpec::literal(SECRET_NAME, SECRET_CONTENTS)];
        with_secrets(h.secrets().as_ref(), &secrets, || async {
            h.run_to_completion(&spec, &expected).await.map(drop)
        })
        .await?;
        Ok(())
    }
    .boxed_local()
}

const KEYSTORE_SECRET: &str = "__dcos_base64__keystore";
const TRUSTSTORE_SECRET: &str = "__dcos_base64__truststore";
const MY_SECRET: &str = "mysecret";
const MY_SECRET_CONTENT: &str = "secretcontent";
const STORE_PASSWORD: &str = "changeit";

/// Driver and executors talk TLS using stores held in the secret store,
/// while an ordinary driver secret stays visible to the job.
pub(super) fn driver_executor_tls(
    ctx: &SuiteContext,
) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let h = &ctx.harness;
        let script = h.upload(ctx.config.resource("jobs/python/pi_with_secret.py")).await?;

        let secrets = [
            SecretSpec::file(KEYSTORE_SECRET, ctx.config.resource("server.jks.base64")),
            SecretSpec::file(TRUSTSTORE_SECRET, ctx.config.resource("trust.jks.base64")),
            SecretSpec::literal(MY_SECRET, MY_SECRET_CONTENT),
        ];

        let spec = JobSpec::new(script)
            .with_flag("--keystore-secret-path", KEYSTORE_SECRET)
            .with_flag("--truststore-secret-path", TRUSTSTORE_SECRET)
            .with_flag("--private-key-password", STORE_PASSWORD)
            .with_flag("--keystore-password", STORE_PASSWORD)
            .with_flag("--truststore-password", STORE_PASSWORD)
            .with_conf("spark.mesos.driver.secret.names", MY_SECRET)
            .with_conf("spark.mesos.driver.secret.filenames", MY_SECRET)
            .with_conf("spark.mesos.driver.secret.envkeys", MY_SECRET)
            .with_args(format!("30 {MY_SECRET} {MY_SECRET_CONTENT}"));

        with_secrets(h.secrets().as_ref(), &secrets, || async {
            h.run_to_completion(&spec, PI_OUTPUT).await.map(drop)
        })
        .await?;
        Ok(())
    }
    .boxed_local()
}
