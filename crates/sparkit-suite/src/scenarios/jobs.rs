use futures::{FutureExt, future::LocalBoxFuture};
use sparkit_core::{ServiceOptions, ServiceScope};
use sparkit_model::{DEFAULT_SERVICE_NAME, JobSpec};
use tracing::info;

use super::{PI_OUTPUT, SPARK_PI_CLASS};
use crate::scenario::{ScenarioError, SuiteContext};

const JOB_RUNNER_CLASS: &str = "com.typesafe.spark.test.mesos.framework.runners.SparkJobRunner";
const MARATHON_GROUP: &str = "/path/to/spark";

/// The integration-test jar exercises the framework from inside a driver.
async fn run_test_jar(ctx: &SuiteContext, service: &str) -> Result<(), ScenarioError> {
    let h = &ctx.harness;
    let jar = ctx.config.test_jar()?;

    let scheme = if ctx.config.strict { "https" } else { "http" };
    let token = h.query().auth_token().await?;
    let args = format!(
        "{scheme}://leader.mesos:5050 dcos \"*\" spark:only 2 --auth-token={token}"
    );

    let spec = JobSpec::new(h.upload(jar).await?)
        .with_class(JOB_RUNNER_CLASS)
        .with_args(args)
        .for_service(service);
    h.run_to_completion(&spec, "All tests passed").await?;
    Ok(())
}

pub(super) fn jar(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    run_test_jar(ctx, DEFAULT_SERVICE_NAME).boxed_local()
}

pub(super) fn spark_pi(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let spec = JobSpec::new(ctx.config.spark_examples_url.as_str())
            .with_flags([format!("--class {SPARK_PI_CLASS}")])
            .with_args("100");
        ctx.harness.run_to_completion(&spec, PI_OUTPUT).await?;
        Ok(())
    }
    .boxed_local()
}

pub(super) fn python(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let h = &ctx.harness;
        let script = h.upload(ctx.config.resource("jobs/python/pi_with_include.py")).await?;
        let include = h.upload(ctx.config.resource("jobs/python/PySparkTestInclude.py")).await?;

        let spec = JobSpec::new(script)
            .with_flag("--py-files", include)
            .with_args("30");
        h.run_to_completion(&spec, PI_OUTPUT).await?;
        Ok(())
    }
    .boxed_local()
}

pub(super) fn r(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let h = &ctx.harness;
        let script = h.upload(ctx.config.resource("jobs/R/dataframe.R")).await?;
        h.run_to_completion(&JobSpec::new(script), "Justin").await?;
        Ok(())
    }
    .boxed_local()
}

/// Flag tokens with stray whitespace must resolve like clean ones.
pub(super) fn cli_multiple_spaces(
    ctx: &SuiteContext,
) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let spec = JobSpec::new(ctx.config.spark_examples_url.as_str())
            .with_flags(["--conf ", "spark.cores.max=2", " --class  ", SPARK_PI_CLASS])
            .with_args("30");
        ctx.harness.run_to_completion(&spec, PI_OUTPUT).await?;
        Ok(())
    }
    .boxed_local()
}

/// A second framework instance installed inside a service group.
pub(super) fn marathon_group(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let scope = ServiceScope::setup(
            ctx.harness.services().clone(),
            ServiceOptions::named(MARATHON_GROUP),
        )
        .await?;

        let outcome = run_test_jar(ctx, scope.service_name()).await;

        info!(target: "sparkit.suite", service = MARATHON_GROUP, "removing group service");
        let removed = scope.teardown().await;
        outcome?;
        removed?;
        Ok(())
    }
    .boxed_local()
}
