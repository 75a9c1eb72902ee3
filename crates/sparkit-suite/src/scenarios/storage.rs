use futures::{FutureExt, future::LocalBoxFuture};
use sparkit_core::AssertionFailure;
use sparkit_model::{JobSpec, UrlScheme};
use tracing::info;

use crate::scenario::{ScenarioError, SuiteContext};

const INPUT: &str = "linecount.txt";
const OUTPUT_PREFIX: &str = "linecount-out";
const EXPECTED: &str = "Read 3 lines";

/// A job reading from and writing to the object store.
pub(super) fn s3(ctx: &SuiteContext) -> LocalBoxFuture<'_, Result<(), ScenarioError>> {
    async move {
        let h = &ctx.harness;
        let (key_id, secret_key) = ctx.config.aws_credentials()?;

        let read_url = h
            .upload_as(ctx.config.resource(INPUT), UrlScheme::S3n)
            .await?;
        let write_url = h.store().url_for(OUTPUT_PREFIX, UrlScheme::S3n);

        let job = |app_args: String| {
            JobSpec::new(ctx.scala_jar_url.as_str())
                .with_conf("spark.mesos.driverEnv.AWS_ACCESS_KEY_ID", key_id)
                .with_conf("spark.mesos.driverEnv.AWS_SECRET_ACCESS_KEY", secret_key)
                .with_class("S3Job")
                .with_args(app_args)
        };

        h.run_to_completion(&job(format!("--readUrl {read_url} --writeUrl {write_url}")), EXPECTED)
            .await?;

        let written = h.store().list(OUTPUT_PREFIX).await?;
        if written.is_empty() {
            return Err(AssertionFailure::new(format!("no objects under {OUTPUT_PREFIX}")).into());
        }
        info!(target: "sparkit.suite", objects = written.len(), "job output written");

        // Argument order must not matter to the job.
        h.run_to_completion(&job(format!("--readUrl {read_url} --countOnly")), EXPECTED)
            .await?;
        h.run_to_completion(&job(format!("--countOnly --readUrl {read_url}")), EXPECTED)
            .await?;
        Ok(())
    }
    .boxed_local()
}
