use futures::{FutureExt, future::LocalBoxFuture};
use sparkit_core::{AssertionFailure, check_network_info};
use sparkit_model::{JobSpec, KeyValue};
use tracing::info;

use super::{PI_OUTPUT, SPARK_PI_CLASS};
use crate::scenario::{ScenarioError, SuiteContext};

const NETWORK: &str = "dcos";
const SPARK_PI_FRAMEWORK: &str = "Spark Pi";
const EXECUTORS: usize = 1;

pub(super) fn cni(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let spec = JobSpec::new(ctx.config.spark_examples_url.as_str())
            .with_conf("spark.mesos.network.name", NETWORK)
            .with_class(SPARK_PI_CLASS);
        ctx.harness.run_to_completion(&spec, PI_OUTPUT).await?;
        Ok(())
    }
    .boxed_local()
}

/// Driver and executors must carry the requested network name and labels.
pub(super) fn cni_labels(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let h = &ctx.harness;
        let labels = [KeyValue::new("key1", "val1"), KeyValue::new("key2", "val2")];

        // Long enough to inspect the task infos while it runs.
        let spec = JobSpec::new(ctx.config.spark_examples_url.as_str())
            .with_conf("spark.mesos.network.name", NETWORK)
            .with_conf("spark.mesos.network.labels", "key1:val1,key2:val2")
            .with_conf("spark.cores.max", EXECUTORS.to_string())
            .with_class(SPARK_PI_CLASS)
            .with_args("3000");
        let driver_id = h.submit(&spec).await?;

        if !h.wait_for_executors(SPARK_PI_FRAMEWORK, EXECUTORS).await? {
            return Err(AssertionFailure::new(format!(
                "{EXECUTORS} executor(s) of {SPARK_PI_FRAMEWORK:?} not running in time"
            ))
            .into());
        }

        let driver = h
            .get_task(driver_id.as_str(), false)
            .await?
            .ok_or_else(|| AssertionFailure::new(format!("driver task {driver_id} not found")))?;
        check_network_info(&driver, NETWORK, &labels)?;
        info!(target: "sparkit.suite", task = %driver.id, "driver network info ok");

        let executor = h
            .service_tasks(SPARK_PI_FRAMEWORK)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AssertionFailure::new("no executor task found"))?;
        check_network_info(&executor, NETWORK, &labels)?;
        info!(target: "sparkit.suite", task = %executor.id, "executor network info ok");

        h.await_output(&driver_id, PI_OUTPUT).await?;
        Ok(())
    }
    .boxed_local()
}
