use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{
    config::{LogSink, LoggerConfig},
    error::LoggerError,
    format::LoggerFormat,
};

/// HTTP client internals are noisy at debug; quiet unless named explicitly.
const QUIET: &[(&str, &str)] = &[("hyper", "warn"), ("hyper_util", "warn"), ("reqwest", "warn")];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_new(directives(&cfg.level))
        .map_err(|_| LoggerError::InvalidLogLevel(cfg.level.clone()))?;

    let base = fmt::layer()
        .with_target(cfg.with_targets)
        .with_timer(timer());
    let layer: BoxedLayer = match (cfg.format, cfg.sink) {
        (LoggerFormat::Text, LogSink::Stderr) => base
            .with_ansi(cfg.use_color)
            .with_writer(std::io::stderr)
            .boxed(),
        (LoggerFormat::Text, LogSink::TestWriter) => {
            base.with_ansi(false).with_test_writer().boxed()
        }
        (LoggerFormat::Json, LogSink::Stderr) => base
            .json()
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .boxed(),
        (LoggerFormat::Json, LogSink::TestWriter) => {
            base.json().with_ansi(false).with_test_writer().boxed()
        }
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("global default") || msg.contains("already") {
                LoggerError::AlreadyInitialized
            } else {
                LoggerError::InitializationFailed(msg)
            }
        })
}

/// `level` followed by the [`QUIET`] defaults it does not already mention.
fn directives(level: &str) -> String {
    let mut out: Vec<String> = level
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();
    let named = |target: &str| {
        out.iter()
            .any(|d| d.split('=').next().is_some_and(|t| t.trim() == target))
    };
    let extra: Vec<String> = QUIET
        .iter()
        .filter(|(target, _)| !named(target))
        .map(|(target, lvl)| format!("{target}={lvl}"))
        .collect();
    out.extend(extra);
    out.join(",")
}

fn timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}
