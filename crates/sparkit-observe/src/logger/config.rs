use std::io::IsTerminal;

use crate::logger::format::LoggerFormat;

/// Where log lines are written. Stdout is left to the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogSink {
    #[default]
    Stderr,
    /// libtest's captured output, shown only for failing tests.
    TestWriter,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `"info"` or `"info,sparkit.dcos=debug"`.
    pub level: String,
    pub with_targets: bool,
    /// ANSI colours; ignored for JSON.
    pub use_color: bool,
    pub sink: LogSink,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: std::io::stderr().is_terminal(),
            sink: LogSink::Stderr,
        }
    }
}

impl LoggerConfig {
    /// Debug-level text into the test harness's capture.
    pub fn for_tests() -> Self {
        Self {
            level: "debug".to_string(),
            use_color: false,
            sink: LogSink::TestWriter,
            ..Self::default()
        }
    }
}
