use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use sparkit_core::{Harness, SubmitDefaults, WaitConfig};
use sparkit_dcos::DcosConfig;
use sparkit_exec::ProcRunner;
use sparkit_observe::{LoggerConfig, LoggerFormat, logger_init};
use sparkit_suite::{CATALOGUE, Marker, Selection, SuiteConfig, SuiteRunner};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sparkit")]
#[command(about = "Spark on DC/OS integration suite")]
#[command(version)]
struct Cli {
    /// Only run scenarios carrying this marker (repeatable).
    #[arg(short, long = "marker", value_name = "MARKER")]
    markers: Vec<Marker>,

    /// Only run the named scenario (repeatable).
    #[arg(short = 'k', long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,

    /// List the catalogue and exit.
    #[arg(long)]
    list: bool,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    json: bool,

    #[arg(long, env = "SPARKIT_LOG_FORMAT", default_value = "text")]
    log_format: LoggerFormat,

    /// `EnvFilter` directive.
    #[arg(long, env = "SPARKIT_LOG", default_value = "info")]
    log_level: String,

    /// Seconds between two polls of cluster state.
    #[arg(long, env = "SPARKIT_POLL_SECS", default_value_t = 5)]
    poll_secs: u64,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.list {
        for s in CATALOGUE {
            let markers: Vec<_> = s.markers.iter().map(Marker::as_str).collect();
            println!("{:<22} [{}]", s.name, markers.join(", "));
        }
        return Ok(ExitCode::SUCCESS);
    }

    logger_init(&LoggerConfig {
        format: cli.log_format,
        level: cli.log_level.clone(),
        ..Default::default()
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = SuiteConfig::from_env().context("reading suite environment")?;

    let mut dcos = DcosConfig::default().with_bucket(&config.s3_bucket, &config.s3_prefix);
    for secret in [&config.aws_access_key_id, &config.aws_secret_access_key]
        .into_iter()
        .flatten()
    {
        dcos = dcos.redacting(secret.as_str());
    }

    let wait = WaitConfig::default().with_poll_interval(Duration::from_secs(cli.poll_secs.max(1)));
    let collaborators = sparkit_dcos::collaborators(Arc::new(ProcRunner::new()), dcos, wait);
    let harness = Harness::new(
        collaborators,
        wait,
        SubmitDefaults::default().strict(config.strict),
    );

    let selection = Selection {
        markers: cli.markers,
        names: cli.scenarios,
    };
    let unknown = selection.unknown_names();
    if !unknown.is_empty() {
        anyhow::bail!("unknown scenario(s): {}", unknown.join(", "));
    }

    let report = SuiteRunner::new(harness, config)
        .run(CATALOGUE, &selection)
        .await?;

    if report.scenarios.is_empty() {
        warn!(target: "sparkit.suite", "selection matched no scenario");
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for s in &report.scenarios {
            println!("{:<22} {}", s.name, s.outcome);
        }
        println!("{}", report.summary());
    }
    info!(target: "sparkit.suite", run_id = %report.run_id, "suite finished");

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
