use serde::{Deserialize, Serialize};

/// Service name the framework is installed under unless a scenario says otherwise.
pub const DEFAULT_SERVICE_NAME: &str = "/spark";

/// Everything needed to submit one job to the framework.
///
/// A spec is assembled with the `with_*` builders inside a single scenario and
/// then handed to the submitter by reference; nothing mutates it after that.
///
/// Flags are kept as raw tokens in the order they were added. They are
/// expected to come in `--flag value` pairs, but tokens may carry incidental
/// whitespace (`"--conf "`, `" --class  "`); normalization happens when the
/// invocation is serialized, not here.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    app_url: String,
    #[serde(default)]
    app_args: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flags: Vec<String>,
    service_name: String,
}

impl JobSpec {
    /// Start a spec for the application at `app_url`, targeting [`DEFAULT_SERVICE_NAME`].
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
            app_args: String::new(),
            flags: Vec::new(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    /// Positional argument string passed to the application after its URL.
    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.app_args = args.into();
        self
    }

    /// Append a `flag value` pair.
    pub fn with_flag(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self.flags.push(value.into());
        self
    }

    /// Append raw flag tokens as-is.
    pub fn with_flags<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Append `--conf key=value`.
    pub fn with_conf(self, key: &str, value: impl AsRef<str>) -> Self {
        let pair = format!("{key}={}", value.as_ref());
        self.with_flag("--conf", pair)
    }

    /// Append `--class <main class>`.
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_flag("--class", class)
    }

    /// Target a service other than [`DEFAULT_SERVICE_NAME`].
    pub fn for_service(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    #[inline]
    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    #[inline]
    pub fn app_args(&self) -> &str {
        &self.app_args
    }

    #[inline]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    #[inline]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}
