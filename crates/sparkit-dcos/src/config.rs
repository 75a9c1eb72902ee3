use std::time::Duration;

/// Where the CLIs live and which bucket artifacts go to.
#[derive(Debug, Clone)]
pub struct DcosConfig {
    /// `dcos` binary.
    pub cli: String,
    /// `aws` binary.
    pub aws: String,
    pub bucket: String,
    /// Key prefix inside `bucket`; may be empty.
    pub prefix: String,
    /// Catalogue package providing the framework.
    pub package: String,
    /// Budget for a single CLI invocation.
    pub command_timeout: Duration,
    /// Values masked in every logged command line (credentials).
    pub redact: Vec<String>,
}

impl Default for DcosConfig {
    fn default() -> Self {
        Self {
            cli: "dcos".to_string(),
            aws: "aws".to_string(),
            bucket: String::new(),
            prefix: String::new(),
            package: "spark".to_string(),
            command_timeout: Duration::from_secs(300),
            redact: Vec::new(),
        }
    }
}

impl DcosConfig {
    pub fn with_bucket(mut self, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    pub fn redacting(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.redact.push(value);
        }
        self
    }
}
